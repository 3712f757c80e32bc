//! Output writers.
//!
//! - [`csv`]: QA pairs and the WHO category listing as fully quoted CSV
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── who_qapairs.csv
//! ├── who_categogies.csv
//! ├── cdc_qapairs.csv
//! ├── cdc_qapairs19dic.csv
//! └── cnn_qapairs.csv
//! ```

pub mod csv;
