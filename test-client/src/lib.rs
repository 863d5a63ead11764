//! the client generated from `tests/fixtures/countries`, compiled as a
//! consumer crate would compile it

include!(concat!(env!("OUT_DIR"), "/countries.rs"));
