//! Printable implementation for Bss.

use std::io::Write;

use crate::netlink::genl::nl80211::Bss;
use crate::output::formatting::format_ssid;
use crate::output::{OutputOptions, Printable};

impl Printable for Bss {
    fn print_text<W: Write>(&self, w: &mut W, _opts: &OutputOptions) -> std::io::Result<()> {
        writeln!(w, "BSS {} ({})", self.bssid, self.status)?;
        writeln!(w, "\tSSID: {}", format_ssid(&self.ssid))?;
        writeln!(w, "\tfreq: {}", self.frequency)?;
        writeln!(
            w,
            "\tbeacon interval: {} TUs",
            self.beacon_interval.as_micros() / 1024
        )?;
        writeln!(w, "\tlast seen: {} ms ago", self.last_seen.as_millis())?;
        Ok(())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::netlink::genl::nl80211::{BssStatus, HardwareAddr};

    fn bss() -> Bss {
        Bss {
            bssid: HardwareAddr([0xa0, 0xb1, 0xc2, 0xd3, 0xe4, 0xf5]),
            ssid: b"home".to_vec(),
            frequency: 2437,
            beacon_interval: Duration::from_micros(102_400),
            last_seen: Duration::from_millis(12),
            status: BssStatus::Associated,
        }
    }

    #[test]
    fn test_text() {
        let mut out = Vec::new();
        bss().print_text(&mut out, &OutputOptions::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("BSS a0:b1:c2:d3:e4:f5 (associated)\n"));
        assert!(text.contains("\tSSID: home\n"));
        assert!(text.contains("\tbeacon interval: 100 TUs\n"));
    }

    #[test]
    fn test_json() {
        let json = bss().to_json();
        assert_eq!(json["bssid"], "a0:b1:c2:d3:e4:f5");
        assert_eq!(json["ssid"], "home");
        assert_eq!(json["beacon_interval"], 102);
        assert_eq!(json["last_seen"], 12);
        assert_eq!(json["status"], "associated");
    }
}
