//! Example: design the 8x cascade for 48 kHz audio and run it both ways

use math_audio_oversampling::*;

fn main() -> Result<()> {
    println!("Halfband Cascade Example");
    println!("========================\n");

    let config = CascadeConfigBuilder::new()
        .base_sample_rate(48000.0)
        .max_oversampling(8)
        .target_stopband_attenuation_db(-60.0)
        .build()?;

    let report = design_cascade(&config)?;
    print!("{}", report);

    // Upsample a 1 kHz tone to 384 kHz and bring it back down
    println!("\nRound trip of a 1 kHz tone (48 kHz -> 384 kHz -> 48 kHz):");
    let mut up = InterpolatorCascade::from_report(&report)?;
    let mut down = DecimatorCascade::from_report(&report)?;

    let input: Vec<f64> = (0..4800)
        .map(|n| (2.0 * std::f64::consts::PI * 1000.0 * n as f64 / 48000.0).sin())
        .collect();
    let oversampled = up.process_block(&input);
    let output = down.process_block(&oversampled);

    let peak = output[200..].iter().fold(0.0_f64, |acc, y| acc.max(y.abs()));
    println!(
        "   {} -> {} -> {} samples, peak {:.4}",
        input.len(),
        oversampled.len(),
        output.len(),
        peak
    );

    Ok(())
}
