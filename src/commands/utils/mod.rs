mod help;

pub use help::help;
