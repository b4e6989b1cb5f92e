pub mod lenient;
pub mod logger;
pub mod numeric;
pub mod redact;
pub mod semantic;
