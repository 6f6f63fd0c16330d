//! Audio using the Web Audio API
//!
//! Procedurally generated sounds routed through a single gain channel whose
//! level follows the volume setting.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// The pet cheers (enabled, cheat)
    Yippee,
    /// An apple was dropped onto the page
    AppleDrop,
}

/// Audio manager for the pet
pub struct AudioManager {
    ctx: Option<AudioContext>,
    channel: Option<GainNode>,
    volume: f32,
}

impl AudioManager {
    pub fn new(volume: f32) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        let channel = ctx.as_ref().and_then(|ctx| {
            let gain = ctx.create_gain().ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            Some(gain)
        });

        let mut audio = Self {
            ctx,
            channel,
            volume: 0.0,
        };
        audio.set_volume(volume);
        audio
    }

    /// Set channel gain (0.0 - 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(channel) = &self.channel {
            channel.gain().set_value(self.volume);
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        if self.volume <= 0.0 {
            return;
        }
        let (Some(ctx), Some(channel)) = (&self.ctx, &self.channel) else {
            return;
        };

        // Browsers suspend the context until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Yippee => self.play_yippee(ctx, channel),
            SoundEffect::AppleDrop => self.play_apple_drop(ctx, channel),
        }
    }

    /// Create an oscillator with its own envelope gain, feeding the channel
    fn create_osc(
        &self,
        ctx: &AudioContext,
        channel: &GainNode,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(channel).ok()?;

        Some((osc, gain))
    }

    /// Two quick rising squeaks
    fn play_yippee(&self, ctx: &AudioContext, channel: &GainNode) {
        let t = ctx.current_time();

        for (i, (from, to)) in [(700.0, 1400.0), (900.0, 1800.0)].into_iter().enumerate() {
            let Some((osc, gain)) = self.create_osc(ctx, channel, from, OscillatorType::Square)
            else {
                return;
            };
            let start = t + i as f64 * 0.12;

            gain.gain().set_value_at_time(0.0001, t).ok();
            gain.gain().set_value_at_time(0.2, start).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, start + 0.1)
                .ok();
            osc.frequency().set_value_at_time(from, start).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, start + 0.1)
                .ok();

            osc.start_with_when(start).ok();
            osc.stop_with_when(start + 0.12).ok();
        }
    }

    /// Short falling pop
    fn play_apple_drop(&self, ctx: &AudioContext, channel: &GainNode) {
        let Some((osc, gain)) = self.create_osc(ctx, channel, 520.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.5, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.12)
            .ok();
        osc.frequency().set_value_at_time(520.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(180.0, t + 0.12)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }
}
