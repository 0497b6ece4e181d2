/// Identifies one deferred request. Later requests have larger handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(u64);

/// A deferred-work slot that holds at most one outstanding request.
///
/// Requesting while a request is pending cancels the pending one; the host drains the slot once
/// per frame with [`LatestOnly::take_due`]. A superseded request is never returned, so it does no
/// work.
#[derive(Debug, Default)]
pub struct LatestOnly {
	next: u64,
	pending: Option<TaskHandle>,
	superseded: u64,
	executed: u64,
}

impl LatestOnly {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn request(&mut self) -> TaskHandle {
		let handle = TaskHandle(self.next);
		self.next += 1;
		if let Some(previous) = self.pending.replace(handle) {
			self.superseded += 1;
			tracing::trace!(?previous, ?handle, "superseded pending task");
		}
		handle
	}

	/// Drops the pending request, if any, without counting it as superseded.
	pub fn cancel(&mut self) -> Option<TaskHandle> {
		self.pending.take()
	}

	/// Removes and returns the request that should run on this tick.
	pub fn take_due(&mut self) -> Option<TaskHandle> {
		let due = self.pending.take();
		if due.is_some() {
			self.executed += 1;
		}
		due
	}

	pub fn is_pending(&self) -> bool {
		self.pending.is_some()
	}

	pub fn requested(&self) -> u64 {
		self.next
	}

	pub fn superseded(&self) -> u64 {
		self.superseded
	}

	pub fn executed(&self) -> u64 {
		self.executed
	}
}
