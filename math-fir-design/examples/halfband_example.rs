//! Example: design halfband filters for a few transition widths and run a decimator

use math_audio_fir_design::*;

fn main() -> Result<()> {
    println!("Halfband FIR Design Example");
    println!("===========================\n");

    for (order, transition) in [(2, 0.375), (6, 0.25), (12, 0.0833)] {
        let taps = design_halfband(order, transition, 512, 250)?;
        verify_halfband_structure(&taps, DEFAULT_HALFBAND_TOLERANCE)?;
        let compressed = compress_halfband(&taps)?;

        let (_, stop) = halfband_band_edges(transition);
        let att = stopband_attenuation(&taps, 1.0, 4096, stop, 0.5)?;

        println!(
            "order {:2} ({:2} taps), transition {:.4}: stopband {:.1} dB",
            order,
            taps.len(),
            transition,
            att
        );
        println!("   coefficients: {:?}", compressed);
    }

    // Decimate a 1 kHz tone from 96 kHz to 48 kHz
    println!("\nDecimating a 1 kHz tone (96 kHz -> 48 kHz):");
    let taps = design_halfband(12, 0.0833, 512, 250)?;
    let mut decimator = HalfbandDecimator::new(compress_halfband(&taps)?)?;
    let input: Vec<f64> = (0..9600)
        .map(|n| (2.0 * std::f64::consts::PI * 1000.0 * n as f64 / 96000.0).sin())
        .collect();
    let output = decimator.process_block(&input);
    let peak = output[100..].iter().fold(0.0_f64, |acc, y| acc.max(y.abs()));
    println!("   {} -> {} samples, peak {:.4}", input.len(), output.len(), peak);
    println!("   latency: {} input samples", decimator.latency());

    Ok(())
}
