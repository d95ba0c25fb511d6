mod loader;
mod validate;

pub use loader::{LoadError, load_bank_from_json, parse_bank, read_bank};
pub use validate::{BankDiagnostic, BankFault, QuestionBank};
