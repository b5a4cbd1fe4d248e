//! Printable implementations for the nl80211 record types.

mod bss;
mod interface;
mod station;
