use serde::Serialize;
use tracing::debug;

use tlsscope_core::{Direction, FeedResult, SessionFields, TlsStream, Worker};

/// What one replayed session produced.
#[derive(Debug, Serialize)]
pub struct SessionReport {
    /// Direction the dissector ended up watching, if it attached at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watched: Option<Direction>,
    /// Stopped at a non-handshake record or the end of the server flight.
    pub detached: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub dropped: usize,
    #[serde(flatten)]
    pub session: SessionFields,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Drive one session: chunks alternate client, server, client, ... and the
/// first chunk of each direction is offered for classification. The stream
/// is torn down once both sides are exhausted.
pub fn replay(worker: &mut Worker, client: &[&[u8]], server: &[&[u8]]) -> SessionReport {
    let mut session = SessionFields::new();
    let mut stream: Option<TlsStream> = None;
    let mut detached = false;

    let rounds = client.len().max(server.len());
    for i in 0..rounds {
        for (direction, chunks) in [(Direction::Client, client), (Direction::Server, server)] {
            let Some(chunk) = chunks.get(i) else {
                continue;
            };

            if stream.is_none() && i == 0 {
                stream = TlsStream::classify(worker, &mut session, direction, chunk);
            }

            if let Some(s) = stream.as_mut() {
                if s.feed(worker, &mut session, direction, chunk) == FeedResult::Detached
                    && !detached
                {
                    debug!("dissector detached at {} chunk {}", direction, i);
                    detached = true;
                }
            }
        }
    }

    let mut report = SessionReport {
        watched: None,
        detached,
        dropped: 0,
        session,
    };

    if let Some(mut s) = stream {
        s.finish(worker, &mut report.session);
        report.watched = Some(s.direction());
        report.dropped = s.dropped();
    }
    report
}
