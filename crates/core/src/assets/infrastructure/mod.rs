pub mod directory_scanner;
pub mod reference_loader;
