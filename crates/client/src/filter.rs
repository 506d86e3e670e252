use crate::Message;

/// Error a filter returns to drop a message.
pub type FilterError = Box<dyn std::error::Error + Send + Sync>;

/// Transform applied to each outbound message before it is written.
///
/// Returning `Ok(None)` or an error drops the message. Dropped messages are
/// not reported anywhere: the producer already returned from `send`.
pub trait MessageFilter: Send + 'static {
    /// Transforms or drops one message.
    fn filter(&mut self, message: Message) -> Result<Option<Message>, FilterError>;
}

impl<F, E> MessageFilter for F
where
    F: FnMut(Message) -> Result<Option<Message>, E> + Send + 'static,
    E: Into<FilterError>,
{
    fn filter(&mut self, message: Message) -> Result<Option<Message>, FilterError> {
        self(message).map_err(Into::into)
    }
}

/// Filter that lets every message through unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

impl MessageFilter for PassThrough {
    fn filter(&mut self, message: Message) -> Result<Option<Message>, FilterError> {
        Ok(Some(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_errors_are_boxed() {
        let mut filter = |message: Message| {
            if message == Message::text("secret") {
                Err("redacted")
            } else {
                Ok(Some(message))
            }
        };

        assert!(MessageFilter::filter(&mut filter, Message::text("secret")).is_err());
        assert_eq!(
            MessageFilter::filter(&mut filter, Message::text("public")).unwrap(),
            Some(Message::text("public"))
        );
    }

    #[test]
    fn test_pass_through() {
        let message = Message::binary(vec![1u8, 2]);
        assert_eq!(
            PassThrough.filter(message.clone()).unwrap(),
            Some(message)
        );
    }
}
