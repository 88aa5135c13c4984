pub mod list_species;
pub mod run;
