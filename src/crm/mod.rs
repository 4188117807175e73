pub mod translator;
