//! Backend commands queued from UI to backend worker.

pub enum BackendCommand {
    /// Run one speakers-then-sessions fetch cycle; results are tagged with
    /// `generation` so the controller can drop superseded ones.
    FetchTimeline { generation: u64 },
}
