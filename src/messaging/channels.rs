// Communication channels lock-free

use crate::messaging::command::Command;
use crate::messaging::notification::StepEvent;
use ringbuf::{HeapRb, traits::Split};

pub type CommandProducer = ringbuf::HeapProd<Command>;
pub type CommandConsumer = ringbuf::HeapCons<Command>;

/// UI -> audio command queue
pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<Command>::new(capacity);
    rb.split()
}

pub type StepEventProducer = ringbuf::HeapProd<StepEvent>;
pub type StepEventConsumer = ringbuf::HeapCons<StepEvent>;

/// Audio -> UI step event queue
pub fn create_step_event_channel(capacity: usize) -> (StepEventProducer, StepEventConsumer) {
    let rb = HeapRb::<StepEvent>::new(capacity);
    rb.split()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::GaitKind;
    use ringbuf::traits::{Consumer, Producer};

    #[test]
    fn test_command_channel_roundtrip() {
        let (mut tx, mut rx) = create_command_channel(4);

        tx.try_push(Command::Play).unwrap();
        tx.try_push(Command::SetParameters {
            kind: GaitKind::Skip,
            period: 1.0,
            asymmetry: 0.6,
        })
        .unwrap();

        assert_eq!(rx.try_pop(), Some(Command::Play));
        assert!(matches!(
            rx.try_pop(),
            Some(Command::SetParameters { kind: GaitKind::Skip, .. })
        ));
        assert_eq!(rx.try_pop(), None);
    }

    #[test]
    fn test_full_channel_rejects() {
        let (mut tx, _rx) = create_step_event_channel(1);
        let event = StepEvent::SpriteChange {
            sprite: crate::pattern::Sprite::LeftStep,
            time: 0.0,
        };

        assert!(tx.try_push(event).is_ok());
        assert!(tx.try_push(event).is_err());
    }
}
