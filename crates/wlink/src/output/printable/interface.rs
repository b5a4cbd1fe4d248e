//! Printable implementation for Interface.

use std::io::Write;

use crate::netlink::genl::nl80211::Interface;
use crate::output::formatting::channel;
use crate::output::{OutputOptions, Printable};

impl Printable for Interface {
    fn print_text<W: Write>(&self, w: &mut W, opts: &OutputOptions) -> std::io::Result<()> {
        writeln!(w, "Interface {}", self.name)?;
        writeln!(w, "\tifindex {}", self.index)?;
        if opts.details {
            writeln!(w, "\twdev 0x{:x}", self.device)?;
        }
        writeln!(w, "\taddr {}", self.hardware_addr)?;
        writeln!(w, "\ttype {}", self.iftype)?;
        writeln!(w, "\twiphy {}", self.phy)?;
        if let Some(freq) = self.frequency {
            match channel(freq) {
                Some(ch) => writeln!(w, "\tchannel {ch} ({freq} MHz)")?,
                None => writeln!(w, "\tfrequency {freq} MHz")?,
            }
        }
        Ok(())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::genl::nl80211::{HardwareAddr, InterfaceType};

    #[test]
    fn test_text() {
        let ifi = Interface {
            index: 3,
            name: "wlan0".into(),
            hardware_addr: HardwareAddr([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]),
            phy: 0,
            device: 1,
            iftype: InterfaceType::Station,
            frequency: Some(5180),
        };

        let mut out = Vec::new();
        ifi.print_text(&mut out, &OutputOptions::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Interface wlan0\n\tifindex 3\n\taddr 02:11:22:33:44:55\n\ttype managed\n\twiphy 0\n\tchannel 36 (5180 MHz)\n"
        );
    }
}
