use crate::error::FrameRequestError;

/// Handle for one outstanding animation-frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToken(pub i32);

/// Host facility that runs the session's frame callback once, later.
pub trait FrameRequester {
    fn request_frame(&mut self) -> Result<FrameToken, FrameRequestError>;
}

/// Tracks the single pending frame request.
#[derive(Debug, Default)]
pub struct DrawScheduler {
    pending: Option<FrameToken>,
}

impl DrawScheduler {
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Records a newly requested frame. At most one may be outstanding.
    pub fn arm(&mut self, token: FrameToken) {
        debug_assert!(
            self.pending.is_none(),
            "frame {token:?} requested while {:?} is pending",
            self.pending
        );
        self.pending = Some(token);
    }

    /// Consumes the pending token when its frame runs.
    pub fn fire(&mut self) -> Option<FrameToken> {
        self.pending.take()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
