//! Collaborators the session talks to on the host side.

use scream_in_space_core::{FeedbackEffect, GameOverSummary, HudSnapshot, SoundCue};

/// Presentation layer: HUD, menus and cosmetic feedback.
pub trait Ui {
    /// Refreshes the heads-up display.
    fn update_hud(&mut self, hud: HudSnapshot);

    /// Shows the final results.
    fn show_game_over(&mut self, summary: GameOverSummary);

    /// Shows the pause menu.
    fn show_pause_menu(&mut self);

    /// Hides the pause menu.
    fn hide_pause_menu(&mut self);

    /// Shows the boot screen.
    fn show_start_screen(&mut self);

    /// Hides the boot screen.
    fn hide_start_screen(&mut self);

    /// Plays a cosmetic effect. Effects suppressed by the user's settings
    /// never reach this call.
    fn feedback(&mut self, effect: FeedbackEffect);
}

/// Sound output.
pub trait Audio {
    /// Plays a cue. Only called while sound is enabled.
    fn play(&mut self, cue: SoundCue);

    /// Silences everything that is playing.
    fn stop_all(&mut self);
}

/// Bundle of host collaborators owned by a session.
#[derive(Debug, Default)]
pub struct Host<U, A, C> {
    /// Presentation layer.
    pub ui: U,
    /// Sound output.
    pub audio: A,
    /// Frame statistics source.
    pub clock: C,
}

impl<U, A, C> Host<U, A, C> {
    /// Bundles the provided collaborators.
    pub const fn new(ui: U, audio: A, clock: C) -> Self {
        Self { ui, audio, clock }
    }
}
