use crossbeam_channel::{unbounded, Receiver, Sender};

/// Page-wide notifications between otherwise independent widgets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Notice {
    TerminalOpened,
    TerminalClosed,
}

#[derive(Default)]
pub(crate) struct Bus {
    subscribers: Vec<Sender<Notice>>,
}

impl Bus {
    pub(crate) fn subscribe(&mut self) -> Receiver<Notice> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Delivers to every live subscriber; dropped receivers are forgotten.
    pub(crate) fn publish(&mut self, notice: Notice) {
        self.subscribers.retain(|tx| tx.send(notice).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_subscriber_hears_every_notice() {
        let mut bus = Bus::default();
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.publish(Notice::TerminalOpened);
        bus.publish(Notice::TerminalClosed);
        let got_a: Vec<Notice> = a.try_iter().collect();
        let got_b: Vec<Notice> = b.try_iter().collect();
        assert_eq!(got_a, vec![Notice::TerminalOpened, Notice::TerminalClosed]);
        assert_eq!(got_a, got_b);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut bus = Bus::default();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        bus.publish(Notice::TerminalOpened);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.try_recv(), Ok(Notice::TerminalOpened));
    }
}
