//! Printable implementation for StationInfo.

use std::io::Write;

use crate::netlink::genl::nl80211::StationInfo;
use crate::output::formatting::{format_bitrate, format_bytes, format_duration_compact};
use crate::output::{OutputOptions, Printable};

impl Printable for StationInfo {
    fn print_text<W: Write>(&self, w: &mut W, opts: &OutputOptions) -> std::io::Result<()> {
        writeln!(w, "Station {}", self.hardware_addr)?;
        writeln!(w, "\tinactive time:\t{} ms", self.inactive.as_millis())?;
        if opts.details {
            writeln!(w, "\trx bytes:\t{}", self.received_bytes)?;
            writeln!(w, "\ttx bytes:\t{}", self.transmitted_bytes)?;
        } else {
            writeln!(w, "\trx bytes:\t{}", format_bytes(self.received_bytes))?;
            writeln!(w, "\ttx bytes:\t{}", format_bytes(self.transmitted_bytes))?;
        }
        writeln!(w, "\trx packets:\t{}", self.received_packets)?;
        writeln!(w, "\ttx packets:\t{}", self.transmitted_packets)?;
        writeln!(w, "\ttx retries:\t{}", self.transmit_retries)?;
        writeln!(w, "\ttx failed:\t{}", self.transmit_failed)?;
        writeln!(w, "\tbeacon loss:\t{}", self.beacon_loss)?;
        writeln!(w, "\tsignal:\t\t{} dBm", self.signal)?;
        writeln!(w, "\trx bitrate:\t{}", format_bitrate(self.receive_bitrate))?;
        writeln!(w, "\ttx bitrate:\t{}", format_bitrate(self.transmit_bitrate))?;
        writeln!(
            w,
            "\tconnected time:\t{}",
            format_duration_compact(self.connected)
        )?;
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
    use crate::netlink::genl::nl80211::HardwareAddr;

    fn station() -> StationInfo {
        StationInfo {
            hardware_addr: HardwareAddr([0xa0, 0xb1, 0xc2, 0xd3, 0xe4, 0xf5]),
            connected: Duration::from_secs(3725),
            inactive: Duration::from_millis(40),
            received_bytes: 2048,
            signal: -48,
            transmit_bitrate: 866_700_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_text() {
        let mut out = Vec::new();
        station().print_text(&mut out, &OutputOptions::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\trx bytes:\t2.00 KiB\n"));
        assert!(text.contains("\tsignal:\t\t-48 dBm\n"));
        assert!(text.contains("\ttx bitrate:\t866.7 MBit/s\n"));
        assert!(text.contains("\tconnected time:\t1h 2m 5s\n"));
    }

    #[test]
    fn test_json() {
        let json = station().to_json();
        assert_eq!(json["hardware_addr"], "a0:b1:c2:d3:e4:f5");
        assert_eq!(json["connected"], 3_725_000);
        assert_eq!(json["signal"], -48);
        assert_eq!(json["transmit_bitrate"], 866_700_000u64);
    }
}
