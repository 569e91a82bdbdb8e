/// Sound engine: procedural sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Menu clicks rotate through a few slightly different variants so that
/// fast navigation doesn't sound like a machine gun.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::cell::Cell;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    /// Click variants: (frequency, duration).
    const CLICKS: [(f32, f32); 4] = [(1800.0, 0.018), (2100.0, 0.016), (1600.0, 0.020), (1950.0, 0.017)];

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_clicks: Vec<Arc<Vec<u8>>>,
        current_click: Cell<usize>,
        sfx_pour: Arc<Vec<u8>>,
        sfx_snap: Arc<Vec<u8>>,
        sfx_place: Arc<Vec<u8>>,
        sfx_reject: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            // ── Generate all sound buffers ──
            let sfx_clicks = CLICKS.iter()
                .map(|&(freq, dur)| Arc::new(make_wav(&gen_click(freq, dur))))
                .collect();

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_clicks,
                current_click: Cell::new(0),
                sfx_pour: Arc::new(make_wav(&gen_pour())),
                sfx_snap: Arc::new(make_wav(&gen_snap())),
                sfx_place: Arc::new(make_wav(&gen_place())),
                sfx_reject: Arc::new(make_wav(&gen_blip(140.0, 0.09, 0.25))),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        /// Next click variant, wrapping.
        pub fn play_click(&self) {
            let i = self.current_click.get();
            if let Some(buf) = self.sfx_clicks.get(i) {
                self.play(buf);
            }
            self.current_click.set(next_click(i, self.sfx_clicks.len()));
        }

        pub fn play_pour(&self) { self.play(&self.sfx_pour); }
        pub fn play_snap(&self) { self.play(&self.sfx_snap); }
        pub fn play_place(&self) { self.play(&self.sfx_place); }
        pub fn play_reject(&self) { self.play(&self.sfx_reject); }
    }

    pub(super) fn next_click(i: usize, count: usize) -> usize {
        if i + 1 >= count { 0 } else { i + 1 }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Simple sine blip at given frequency and duration
    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32); // linear fade out
                (t * freq * 2.0 * std::f32::consts::PI).sin() * env * volume
            })
            .collect()
    }

    /// UI click: very short tone with a sharp exponential decay
    pub(super) fn gen_click(freq: f32, duration: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = (-(i as f32) / n as f32 * 6.0).exp();
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.8
                    + (t * freq * 2.5 * 2.0 * std::f32::consts::PI).sin() * 0.2;
                wave * env * 0.3
            })
            .collect()
    }

    /// Pour: filtered noise swelling in and trailing off, with a slow
    /// downward tone underneath
    fn gen_pour() -> Vec<f32> {
        let duration = 0.9;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng: u32 = 424242;
        let mut lp = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                // One-pole low-pass softens the hiss into a rush.
                lp += (noise - lp) * 0.15;
                let freq = 320.0 - t * 160.0;
                let tone = (ti * freq * 2.0 * std::f32::consts::PI).sin();
                let env = (t * 8.0).min(1.0) * (1.0 - t).powf(1.5);
                (lp * 0.7 + tone * 0.15) * env * 0.35
            })
            .collect()
    }

    /// Snap: two clicks a few ms apart, the second lower (click-clack)
    fn gen_snap() -> Vec<f32> {
        let mut samples = gen_click(2400.0, 0.015);
        let gap = (SAMPLE_RATE as f32 * 0.025) as usize;
        samples.extend(std::iter::repeat(0.0).take(gap));
        samples.extend(gen_click(1300.0, 0.03).into_iter().map(|s| s * 1.3));
        samples
    }

    /// Place: soft low thud
    fn gen_place() -> Vec<f32> {
        let duration = 0.08;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let freq = 180.0 - t * 90.0;
                let env = (1.0 - t).powf(2.0);
                (ti * freq * 2.0 * std::f32::consts::PI).sin() * env * 0.4
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let clamped = s.clamp(-1.0, 1.0);
            let val = (clamped * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_click(&self) {}
    pub fn play_pour(&self) {}
    pub fn play_snap(&self) {}
    pub fn play_place(&self) {}
    pub fn play_reject(&self) {}
}

#[cfg(all(test, feature = "sound"))]
mod tests {
    use super::inner::{gen_click, make_wav, next_click};

    #[test]
    fn wav_header_matches_payload() {
        let samples = gen_click(1800.0, 0.01);
        let wav = make_wav(&samples);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + samples.len() * 2);
    }

    #[test]
    fn clicks_cycle_through_variants() {
        assert_eq!(next_click(0, 4), 1);
        assert_eq!(next_click(3, 4), 0);
        assert_eq!(next_click(0, 0), 0);
    }
}
