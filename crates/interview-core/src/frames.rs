use tokio::sync::watch;

/// Creates a latest-frame slot shared between a camera and the sampler.
pub fn frame_slot() -> (FramePublisher, FrameSampler) {
    let (tx, rx) = watch::channel(None);
    (FramePublisher { tx }, FrameSampler { rx })
}

/// Producer side: publishes encoded stills, each replacing the previous one.
#[derive(Debug, Clone)]
pub struct FramePublisher {
    tx: watch::Sender<Option<String>>,
}

impl FramePublisher {
    /// Publishes a base64-encoded image. Never blocks.
    pub fn publish(&self, encoded: String) {
        self.tx.send_replace(Some(encoded));
    }
}

/// Consumer side, polled on the sampling cadence.
#[derive(Debug)]
pub struct FrameSampler {
    rx: watch::Receiver<Option<String>>,
}

impl FrameSampler {
    /// Takes the newest frame if one was published since the last sample.
    ///
    /// Returns `None` when the source is not ready; the caller skips this
    /// cadence slot and never waits.
    pub fn sample(&mut self) -> Option<String> {
        match self.rx.has_changed() {
            Ok(true) => self.rx.borrow_and_update().clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_until_published() {
        let (_publisher, mut sampler) = frame_slot();
        assert_eq!(sampler.sample(), None);
    }

    #[test]
    fn test_only_latest_frame_is_taken_once() {
        let (publisher, mut sampler) = frame_slot();

        publisher.publish("b2xk".to_string());
        publisher.publish("bmV3".to_string());

        assert_eq!(sampler.sample().as_deref(), Some("bmV3"));
        assert_eq!(sampler.sample(), None);
    }

    #[test]
    fn test_dropped_camera_is_just_not_ready() {
        let (publisher, mut sampler) = frame_slot();
        drop(publisher);
        assert_eq!(sampler.sample(), None);
    }
}
