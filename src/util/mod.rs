mod printer;
mod utils;

pub use printer::PrinterBuilder;
pub use utils::{BytePath, contains_bytes, ends_with_bytes, trim_base_path, unix_now};
