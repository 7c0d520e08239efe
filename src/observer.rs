use crate::boxes::BoxHeader;

/// Receives human-readable diagnostics while a buffer is walked.
///
/// Purely informational; the walk behaves identically with or without one.
pub trait BoxObserver {
    fn on_box(&mut self, hdr: &BoxHeader);

    /// Called with the single-byte decoded body of every payload box.
    fn on_payload_text(&mut self, _text: &str) {}

    /// Skips decoding the payload text when nobody will look at it.
    fn wants_payload_text(&self) -> bool {
        true
    }
}

impl<T: BoxObserver + ?Sized> BoxObserver for &mut T {
    fn on_box(&mut self, hdr: &BoxHeader) {
        (**self).on_box(hdr)
    }
    fn on_payload_text(&mut self, text: &str) {
        (**self).on_payload_text(text)
    }
    fn wants_payload_text(&self) -> bool {
        (**self).wants_payload_text()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BoxObserver for NoopObserver {
    fn on_box(&mut self, _hdr: &BoxHeader) {}
    fn wants_payload_text(&self) -> bool {
        false
    }
}

/// Forwards the trace lines to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl BoxObserver for TracingObserver {
    fn on_box(&mut self, hdr: &BoxHeader) {
        tracing::debug!(offset = hdr.start, "Found box of type {} and size {}", hdr.typ, hdr.size);
    }

    fn on_payload_text(&mut self, text: &str) {
        tracing::debug!("Content of mdat box is: {}", text);
    }

    fn wants_payload_text(&self) -> bool {
        tracing::enabled!(tracing::Level::DEBUG)
    }
}

/// Collects the trace lines verbatim. Handy for hosts that surface them in
/// their own UI.
#[derive(Debug, Default, Clone)]
pub struct LineCollector {
    pub lines: Vec<String>,
}

impl BoxObserver for LineCollector {
    fn on_box(&mut self, hdr: &BoxHeader) {
        self.lines
            .push(format!("Found box of type {} and size {}", hdr.typ, hdr.size));
    }

    fn on_payload_text(&mut self, text: &str) {
        self.lines.push(format!("Content of mdat box is: {}", text));
    }
}
