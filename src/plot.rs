//! ASCII rendering of the synthesized channels, one trace per channel over
//! sample index. Display only: the packet stream is the authoritative
//! output, and nothing here feeds back into it.

use std::io::{self, Write};

use crate::types::{GradientChannel, SequenceWaveforms};

const PLOT_WIDTH: usize = 72;
const PLOT_HEIGHT: usize = 8;

/// Render all five channel traces (RF, the three gradient axes, receive).
pub fn render<W: Write>(waveforms: &SequenceWaveforms, out: &mut W) -> io::Result<()> {
    write_trace(out, "RF", &waveforms.rf)?;
    for channel in GradientChannel::ALL {
        let label = format!("Gradient {channel}");
        write_trace(out, &label, waveforms.gradient.channel(channel))?;
    }

    let receive: Vec<f64> = waveforms
        .receive
        .iter()
        .map(|&high| if high { 1.0 } else { 0.0 })
        .collect();
    write_trace(out, "Receive", &receive)
}

fn write_trace<W: Write>(out: &mut W, label: &str, samples: &[f64]) -> io::Result<()> {
    // Downsample to the plot width by picking the value at each column
    // center.
    let columns: Vec<f64> = (0..PLOT_WIDTH)
        .map(|column| {
            let index = (column as f64 + 0.5) / PLOT_WIDTH as f64 * samples.len() as f64;
            samples.get(index as usize).copied().unwrap_or(0.0)
        })
        .collect();

    let min = columns
        .iter()
        .cloned()
        .min_by(|a, b| a.total_cmp(b))
        .unwrap_or(0.0)
        .min(0.0);
    let max = columns
        .iter()
        .cloned()
        .max_by(|a, b| a.total_cmp(b))
        .unwrap_or(0.0)
        .max(0.0);

    writeln!(out, "{label}")?;
    for row in 0..=PLOT_HEIGHT {
        let y = max - (max - min) * (row as f64 / PLOT_HEIGHT as f64);
        write!(out, "{y:-8.2} | ")?;
        for &sample in &columns {
            if (y > 0.0) != (y >= sample) {
                write!(out, "█")?;
            } else {
                write!(out, " ")?;
            }
        }
        writeln!(out)?;
    }
    writeln!(out)
}
