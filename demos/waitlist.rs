//! A login waitlist: connections that have asked to identify and are waiting
//! to prove it. Each connection id maps to its pending challenge, or to `None`
//! once it has failed and must not try again.

use pod_hash::HashMap;
use pod_hash::Visit;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Challenge {
    identity: u64,
    nonce: u64,
}

#[derive(Debug, PartialEq, Eq)]
enum Reply {
    Challenge(u64),
    Accepted(u64),
    Rejected,
}

struct Waitlist {
    pending: HashMap<u64, Option<Challenge>>,
    rng: SmallRng,
}

impl Waitlist {
    fn new() -> Self {
        Self {
            pending: HashMap::new(),
            rng: SmallRng::seed_from_u64(7),
        }
    }

    fn identify(&mut self, connection: u64, identity: u64) -> Result<Reply, pod_hash::Error> {
        if self.pending.contains_key(&connection) {
            return Ok(Reply::Rejected);
        }
        // Odd identities play the part of banned accounts.
        if identity % 2 == 1 {
            self.pending.put(connection, None)?;
            return Ok(Reply::Rejected);
        }

        let nonce = self.rng.random();
        self.pending
            .put(connection, Some(Challenge { identity, nonce }))?;
        Ok(Reply::Challenge(nonce))
    }

    fn authenticate(&mut self, connection: u64, proof: u64) -> Reply {
        let index = self.pending.find(&connection);
        match self.pending.value_at(index).flatten() {
            Some(challenge) if proof == challenge.nonce ^ challenge.identity => {
                Reply::Accepted(challenge.identity)
            }
            Some(_) => {
                self.pending.set_value(index, None);
                Reply::Rejected
            }
            None => Reply::Rejected,
        }
    }

    fn disconnect(&mut self, connection: u64) -> Option<Challenge> {
        let index = self.pending.find(&connection);
        self.pending.remove_at(index, true).and_then(|(_, c)| c)
    }

    fn drop_blocked(&mut self) -> usize {
        let mut dropped = 0;
        self.pending.iterate(|_, _, challenge| {
            if challenge.is_none() {
                dropped += 1;
                Visit::Remove
            } else {
                Visit::Continue
            }
        });
        dropped
    }
}

fn main() -> Result<(), pod_hash::Error> {
    let mut waitlist = Waitlist::new();

    let mut nonces = Vec::new();
    for connection in 0..10u64 {
        match waitlist.identify(connection, connection * 3)? {
            Reply::Challenge(nonce) => nonces.push((connection, nonce)),
            reply => println!("connection {connection}: {reply:?}"),
        }
    }
    println!("second identify from 0: {:?}", waitlist.identify(0, 0)?);

    for (connection, nonce) in nonces {
        let identity = connection * 3;
        // Every fourth connection sends a bad proof.
        let proof = if connection % 4 == 0 {
            nonce
        } else {
            nonce ^ identity
        };
        println!(
            "connection {connection}: {:?}",
            waitlist.authenticate(connection, proof)
        );
    }

    println!("disconnect 2: {:?}", waitlist.disconnect(2));
    let waiting = waitlist.pending.len();
    let dropped = waitlist.drop_blocked();
    println!(
        "waiting: {waiting}, blocked dropped: {dropped}, still waiting: {}",
        waitlist.pending.len()
    );

    Ok(())
}
