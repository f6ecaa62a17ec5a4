//! # Pass State Tracking
//!
//! Records which logical render pass is open. Passes are tagged with
//! [`RenderPass`] and tracked in a [`RenderPassSet`] bitmask, so the frame
//! loop can ask whether a pass is running and sequencing mistakes surface as
//! [`RenderError::InvalidPassTransition`] instead of silently corrupting state.
//!
//! Only one pass may be open at a time. The mask representation leaves room
//! for overlapping passes later without changing the call sites.

use std::fmt;

use bitflags::bitflags;

use crate::render::{RenderError, RenderResult};

/// Logical stage of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPass {
    /// No pass is open
    None,
    /// Depth rendering from each shadow-casting light
    Shadow,
    /// Geometry attributes into the G-buffer
    GBuffer,
    /// Full-screen lighting from G-buffer attributes
    Lighting,
    /// Forward-shaded transparent geometry
    Transparency,
    /// Screen-space effects
    PostProcess,
    /// Auxiliary line geometry
    Debug,
    /// Background fill
    Skybox,
    /// Copy of the final image into the back buffer
    Composite,
    /// Screen-space overlay
    Ui,
}

bitflags! {
    /// Set of render passes, one bit per [`RenderPass`] (except `None`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RenderPassSet: u16 {
        /// Shadow pass bit
        const SHADOW = 1 << 0;
        /// G-buffer pass bit
        const GBUFFER = 1 << 1;
        /// Lighting pass bit
        const LIGHTING = 1 << 2;
        /// Transparency pass bit
        const TRANSPARENCY = 1 << 3;
        /// Post-process pass bit
        const POST_PROCESS = 1 << 4;
        /// Debug pass bit
        const DEBUG = 1 << 5;
        /// Skybox pass bit
        const SKYBOX = 1 << 6;
        /// Composite pass bit
        const COMPOSITE = 1 << 7;
        /// UI pass bit
        const UI = 1 << 8;
    }
}

impl RenderPass {
    /// Bit of this pass in a [`RenderPassSet`]; empty for `None`
    pub const fn flag(self) -> RenderPassSet {
        match self {
            Self::None => RenderPassSet::empty(),
            Self::Shadow => RenderPassSet::SHADOW,
            Self::GBuffer => RenderPassSet::GBUFFER,
            Self::Lighting => RenderPassSet::LIGHTING,
            Self::Transparency => RenderPassSet::TRANSPARENCY,
            Self::PostProcess => RenderPassSet::POST_PROCESS,
            Self::Debug => RenderPassSet::DEBUG,
            Self::Skybox => RenderPassSet::SKYBOX,
            Self::Composite => RenderPassSet::COMPOSITE,
            Self::Ui => RenderPassSet::UI,
        }
    }

    /// Human readable pass name
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Shadow => "Shadow",
            Self::GBuffer => "GBuffer",
            Self::Lighting => "Lighting",
            Self::Transparency => "Transparency",
            Self::PostProcess => "PostProcess",
            Self::Debug => "Debug",
            Self::Skybox => "Skybox",
            Self::Composite => "Composite",
            Self::Ui => "UI",
        }
    }
}

impl fmt::Display for RenderPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tracks the open render pass for the current frame
#[derive(Debug, Clone, Default)]
pub struct PassStateTracker {
    current: Option<RenderPass>,
    active: RenderPassSet,
}

impl PassStateTracker {
    /// Create a tracker with no open pass
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `pass` and make it current
    ///
    /// Rejected when `pass` is already active, when another pass is still
    /// open, or when `pass` is [`RenderPass::None`]. State is unchanged on error.
    pub fn begin_render_pass(&mut self, pass: RenderPass) -> RenderResult<()> {
        if pass == RenderPass::None {
            return Err(self.transition_error(pass, "the None pass cannot be opened"));
        }

        if self.active.contains(pass.flag()) {
            return Err(self.transition_error(pass, "pass is already active"));
        }

        if self.current.is_some() {
            return Err(self.transition_error(pass, "another pass is still open"));
        }

        self.active |= pass.flag();
        self.current = Some(pass);
        log::trace!("Begin render pass {}", pass);
        Ok(())
    }

    /// Close `pass`
    ///
    /// Clears the pass bit and resets the current pass. Closing a pass that is
    /// not current is rejected and leaves the tracker untouched.
    pub fn end_render_pass(&mut self, pass: RenderPass) -> RenderResult<()> {
        if self.current != Some(pass) {
            return Err(self.transition_error(pass, "pass is not the current pass"));
        }

        self.active.remove(pass.flag());
        self.current = None;
        log::trace!("End render pass {}", pass);
        Ok(())
    }

    /// Whether `pass` is currently open
    pub fn is_render_pass_active(&self, pass: RenderPass) -> bool {
        pass != RenderPass::None && self.active.contains(pass.flag())
    }

    /// The current pass, [`RenderPass::None`] between passes
    pub fn current_pass(&self) -> RenderPass {
        self.current.unwrap_or(RenderPass::None)
    }

    /// Bitmask of open passes
    pub fn active_passes(&self) -> RenderPassSet {
        self.active
    }

    fn transition_error(&self, pass: RenderPass, reason: &'static str) -> RenderError {
        RenderError::InvalidPassTransition {
            pass,
            current: self.current_pass(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PASSES: [RenderPass; 9] = [
        RenderPass::Shadow,
        RenderPass::GBuffer,
        RenderPass::Lighting,
        RenderPass::Transparency,
        RenderPass::PostProcess,
        RenderPass::Debug,
        RenderPass::Skybox,
        RenderPass::Composite,
        RenderPass::Ui,
    ];

    #[test]
    fn test_begin_sets_current_and_active() {
        let mut tracker = PassStateTracker::new();
        tracker.begin_render_pass(RenderPass::GBuffer).unwrap();

        assert_eq!(tracker.current_pass(), RenderPass::GBuffer);
        assert!(tracker.is_render_pass_active(RenderPass::GBuffer));
        assert_eq!(tracker.active_passes(), RenderPassSet::GBUFFER);
    }

    #[test]
    fn test_end_resets_current() {
        let mut tracker = PassStateTracker::new();
        tracker.begin_render_pass(RenderPass::Shadow).unwrap();
        tracker.end_render_pass(RenderPass::Shadow).unwrap();

        assert_eq!(tracker.current_pass(), RenderPass::None);
        assert!(!tracker.is_render_pass_active(RenderPass::Shadow));
        assert!(tracker.active_passes().is_empty());
    }

    #[test]
    fn test_repeated_begin_is_rejected() {
        let mut tracker = PassStateTracker::new();
        tracker.begin_render_pass(RenderPass::Lighting).unwrap();

        let result = tracker.begin_render_pass(RenderPass::Lighting);
        assert!(matches!(result, Err(RenderError::InvalidPassTransition { pass: RenderPass::Lighting, .. })));
        assert_eq!(tracker.current_pass(), RenderPass::Lighting);
    }

    #[test]
    fn test_overlapping_begin_is_rejected() {
        let mut tracker = PassStateTracker::new();
        tracker.begin_render_pass(RenderPass::GBuffer).unwrap();

        assert!(tracker.begin_render_pass(RenderPass::Lighting).is_err());
        assert!(!tracker.is_render_pass_active(RenderPass::Lighting));
        assert_eq!(tracker.active_passes(), RenderPassSet::GBUFFER);
    }

    #[test]
    fn test_end_of_non_current_pass_leaves_state() {
        let mut tracker = PassStateTracker::new();
        tracker.begin_render_pass(RenderPass::GBuffer).unwrap();

        let result = tracker.end_render_pass(RenderPass::Lighting);
        assert!(result.is_err());
        assert_eq!(tracker.current_pass(), RenderPass::GBuffer);
        assert!(tracker.is_render_pass_active(RenderPass::GBuffer));
        assert_eq!(tracker.active_passes(), RenderPassSet::GBUFFER);
    }

    #[test]
    fn test_none_pass_cannot_begin() {
        let mut tracker = PassStateTracker::new();
        assert!(tracker.begin_render_pass(RenderPass::None).is_err());
        assert!(!tracker.is_render_pass_active(RenderPass::None));
    }

    #[test]
    fn test_well_paired_sequence_never_overlaps() {
        let mut tracker = PassStateTracker::new();

        for _frame in 0..3 {
            for pass in ALL_PASSES {
                tracker.begin_render_pass(pass).unwrap();
                let open: Vec<_> = ALL_PASSES
                    .iter()
                    .filter(|p| tracker.is_render_pass_active(**p))
                    .collect();
                assert_eq!(open, vec![&pass]);
                tracker.end_render_pass(pass).unwrap();
            }
        }

        assert!(tracker.active_passes().is_empty());
    }

    #[test]
    fn test_pass_flags_are_distinct() {
        let mut seen = RenderPassSet::empty();
        for pass in ALL_PASSES {
            assert!(!seen.intersects(pass.flag()));
            seen |= pass.flag();
        }
        assert_eq!(seen, RenderPassSet::all());
        assert!(RenderPass::None.flag().is_empty());
    }
}
