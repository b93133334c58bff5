mod snoop;

pub use snoop::Snoop;
