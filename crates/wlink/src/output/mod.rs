//! Text and JSON rendering of wireless records.
//!
//! Used by the `wifi` binary. Records print as `iw`-style text, or as JSON
//! through their `serde::Serialize` implementations.

pub mod formatting;
mod printable;

use std::io::{self, Write};

use crate::netlink::error::Result;

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output rendering options.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Pretty-print JSON.
    pub pretty: bool,
    /// Include less common fields in text output.
    pub details: bool,
}

/// A record that can be printed as text or JSON.
pub trait Printable {
    /// Print the record in text format.
    fn print_text<W: Write>(&self, w: &mut W, opts: &OutputOptions) -> io::Result<()>;

    /// Convert the record to a JSON value.
    fn to_json(&self) -> serde_json::Value;
}

/// Print a single record.
pub fn print_one<W, P>(w: &mut W, item: &P, format: OutputFormat, opts: &OutputOptions) -> Result<()>
where
    W: Write,
    P: Printable,
{
    match format {
        OutputFormat::Text => item.print_text(w, opts)?,
        OutputFormat::Json => write_json(w, &item.to_json(), opts)?,
    }
    Ok(())
}

/// Print a list of records; JSON output is a single array.
pub fn print_all<W, P>(w: &mut W, items: &[P], format: OutputFormat, opts: &OutputOptions) -> Result<()>
where
    W: Write,
    P: Printable,
{
    match format {
        OutputFormat::Text => {
            for item in items {
                item.print_text(w, opts)?;
            }
        }
        OutputFormat::Json => {
            let array = serde_json::Value::Array(items.iter().map(Printable::to_json).collect());
            write_json(w, &array, opts)?;
        }
    }
    Ok(())
}

fn write_json<W: Write>(w: &mut W, value: &serde_json::Value, opts: &OutputOptions) -> Result<()> {
    if opts.pretty {
        serde_json::to_writer_pretty(&mut *w, value)?;
    } else {
        serde_json::to_writer(&mut *w, value)?;
    }
    writeln!(w)?;
    Ok(())
}

/// `serialize_with` helpers for record fields.
pub(crate) mod ser {
    use std::time::Duration;

    use serde::Serializer;

    /// Serialize a duration as whole milliseconds.
    pub fn millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    /// Serialize raw octets as text, replacing invalid UTF-8.
    pub fn lossy_text<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::genl::nl80211::{HardwareAddr, Interface, InterfaceType};

    fn wlan0() -> Interface {
        Interface {
            index: 3,
            name: "wlan0".into(),
            hardware_addr: HardwareAddr([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]),
            iftype: InterfaceType::Station,
            frequency: Some(2412),
            ..Default::default()
        }
    }

    #[test]
    fn test_json_list() {
        let mut out = Vec::new();
        print_all(
            &mut out,
            &[wlan0()],
            OutputFormat::Json,
            &OutputOptions::default(),
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["name"], "wlan0");
        assert_eq!(value[0]["hardware_addr"], "02:11:22:33:44:55");
        assert_eq!(value[0]["iftype"], "managed");
        assert_eq!(value[0]["frequency"], 2412);
    }

    #[test]
    fn test_pretty_json_is_multiline() {
        let mut out = Vec::new();
        let opts = OutputOptions {
            pretty: true,
            ..Default::default()
        };
        print_one(&mut out, &wlan0(), OutputFormat::Json, &opts).unwrap();
        assert!(String::from_utf8(out).unwrap().lines().count() > 1);
    }
}
