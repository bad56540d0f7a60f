mod columns;
mod detect;
mod filename_date;
mod output;
mod run;
mod table;

pub use filename_date::date_from_filename;
pub use run::run;
