//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed. Every
//! call is best-effort: a missing or suspended AudioContext just means
//! silence, never an error the simulation can see.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player left the ground
    Jump,
    /// Player touched a deadly pool
    Death,
    /// Element flip in a transmute pool
    Transmute,
    /// Gem picked up
    GemCollect,
    /// Player stepped onto its exit door
    DoorEnter,
    /// Level complete
    Win,
    /// Manual restart
    Reset,
}

impl SoundEffect {
    /// Map a simulation event to its cue, if it has one.
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jumped { .. } => Some(SoundEffect::Jump),
            GameEvent::Died { .. } => Some(SoundEffect::Death),
            GameEvent::Transmuted { .. } => Some(SoundEffect::Transmute),
            GameEvent::GemCollected { .. } => Some(SoundEffect::GemCollect),
            GameEvent::DoorEntered { .. } => Some(SoundEffect::DoorEnter),
            GameEvent::Won => Some(SoundEffect::Win),
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context; the game plays on silently
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Play a sound effect at the settings' effective volume
    pub fn play(&self, effect: SoundEffect, settings: &Settings) {
        let vol = settings.effective_sound_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Jump => self.play_jump(ctx, vol),
            SoundEffect::Death => self.play_death(ctx, vol),
            SoundEffect::Transmute => self.play_transmute(ctx, vol),
            SoundEffect::GemCollect => self.play_gem(ctx, vol),
            SoundEffect::DoorEnter => self.play_door(ctx, vol),
            SoundEffect::Win => self.play_win(ctx, vol),
            SoundEffect::Reset => self.play_reset(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Jump - quick upward chirp
    fn play_jump(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.12)
            .ok();
        osc.frequency().set_value_at_time(300.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(600.0, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Death - falling sawtooth groan
    fn play_death(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                .ok();
            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(55.0, t + 0.35)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.45).ok();
        }

        // Bass thump underneath
        if let Some((osc, gain)) = self.create_osc(ctx, 60.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.18).ok();
        }
    }

    /// Transmute - shimmering sweep, the classic "woosh"
    fn play_transmute(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 400.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.3)
            .ok();
        osc.frequency().set_value_at_time(400.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(1200.0, t + 0.15)
            .ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(500.0, t + 0.3)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.32).ok();
    }

    /// Gem pickup - bright double ping
    fn play_gem(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 880.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.12).ok();
        }
        if let Some((osc, gain)) = self.create_osc(ctx, 1320.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(0.0001, t).ok();
            gain.gain().set_value_at_time(vol * 0.3, t + 0.08).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.22).ok();
        }
    }

    /// Door entry - soft low ping
    fn play_door(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 520.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.15)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.18).ok();
    }

    /// Win - rising three-note fanfare
    fn play_win(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        for (i, freq) in [523.0, 659.0, 784.0].iter().enumerate() {
            let at = t + i as f64 * 0.15;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                gain.gain().set_value_at_time(0.0001, t).ok();
                gain.gain().set_value_at_time(vol * 0.35, at).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, at + 0.3)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(at + 0.35).ok();
            }
        }
    }

    /// Reset - short neutral blip
    fn play_reset(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 240.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.12).ok();
    }
}
