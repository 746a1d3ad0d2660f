use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
	Success,
	Error,
}

/// A short notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
	pub kind: ToastKind,
	pub title: String,
	pub message: String,
}

/// The sending end of the notification queue.
#[derive(Debug, Clone)]
pub struct Toasts {
	sender: mpsc::UnboundedSender<Toast>,
}

impl Toasts {
	pub fn channel() -> (Self, mpsc::UnboundedReceiver<Toast>) {
		let (sender, receiver) = mpsc::unbounded_channel();

		(Self { sender }, receiver)
	}

	pub fn success(&self, title: impl Into<String>, message: impl Into<String>) {
		self.push(ToastKind::Success, title.into(), message.into());
	}

	pub fn error(&self, title: impl Into<String>, message: impl Into<String>) {
		self.push(ToastKind::Error, title.into(), message.into());
	}

	fn push(&self, kind: ToastKind, title: String, message: String) {
		// Nobody is showing notifications anymore
		if self.sender.send(Toast { kind, title, message }).is_err() {
			tracing::debug!("dropped notification");
		}
	}
}
