//! Single-slot hand-off for packets received in radio context.
//!
//! The radio side (an interrupt callback or a network task) calls
//! [`PacketSlot::offer`] with a whole packet; the main loop drains it through
//! a [`PacketSource`], which turns packets back into a byte stream for the
//! link's line assembler. The slot holds at most one packet: a newer packet
//! replaces one the loop has not taken yet, and the loop always takes a
//! packet whole, so a half-written packet is never observed.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use heapless::Vec;
use log::debug;
use thiserror_no_std::Error;

use core::sync::atomic::{AtomicBool, Ordering};

use super::{ByteSource, LineSink, LinkError};

/// Largest packet the slot stores, including the newline appended on take.
pub const PACKET_CAPACITY: usize = 256;

pub type Packet = Vec<u8, PACKET_CAPACITY>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet is empty")]
    Empty,
    #[error("packet of {0} bytes does not fit the slot")]
    TooLarge(usize),
}

pub struct PacketSlot {
    signal: Signal<CriticalSectionRawMutex, Packet>,
}

impl Default for PacketSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketSlot {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Store a copy of `bytes`, replacing any packet not yet taken.
    ///
    /// Safe to call from callback context; it never blocks for longer than a
    /// critical section.
    pub fn offer(&self, bytes: &[u8]) -> Result<(), PacketError> {
        if bytes.is_empty() {
            return Err(PacketError::Empty);
        }
        // One byte stays free for the terminator added by `PacketSource`.
        if bytes.len() >= PACKET_CAPACITY {
            return Err(PacketError::TooLarge(bytes.len()));
        }
        let packet = Packet::from_slice(bytes).map_err(|_| PacketError::TooLarge(bytes.len()))?;
        if self.signal.signaled() {
            debug!("Replacing unconsumed wireless packet");
        }
        self.signal.signal(packet);
        Ok(())
    }

    /// Take the pending packet, leaving the slot empty.
    pub fn take(&self) -> Option<Packet> {
        self.signal.try_take()
    }

    pub fn is_pending(&self) -> bool {
        self.signal.signaled()
    }

    /// Wait for a packet and take it.
    pub async fn wait(&self) -> Packet {
        self.signal.wait().await
    }
}

/// Byte view over a [`PacketSlot`].
///
/// Each packet is one record: a packet that does not end in `\n` gets one
/// appended so it frames on its own.
pub struct PacketSource<'a> {
    slot: &'a PacketSlot,
    current: Packet,
    position: usize,
}

impl<'a> PacketSource<'a> {
    pub const fn new(slot: &'a PacketSlot) -> Self {
        Self {
            slot,
            current: Vec::new(),
            position: 0,
        }
    }
}

impl ByteSource for PacketSource<'_> {
    fn read_byte(&mut self) -> Option<u8> {
        if self.position >= self.current.len() {
            let mut packet = self.slot.take()?;
            if packet.last() != Some(&b'\n') {
                // `offer` keeps one byte of headroom, so this cannot fail.
                let _ = packet.push(b'\n');
            }
            self.current = packet;
            self.position = 0;
        }
        let byte = self.current.get(self.position).copied();
        self.position += 1;
        byte
    }
}

/// Both directions of a packet-based link plus the peer state.
///
/// The radio side offers received packets into [`inbound`](Self::inbound),
/// waits on [`outbound`](Self::outbound) for lines to transmit and reports
/// whether it currently has a peer to send them to.
pub struct PacketChannel {
    inbound: PacketSlot,
    outbound: PacketSlot,
    peer: AtomicBool,
}

impl Default for PacketChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketChannel {
    pub const fn new() -> Self {
        Self {
            inbound: PacketSlot::new(),
            outbound: PacketSlot::new(),
            peer: AtomicBool::new(false),
        }
    }

    pub fn inbound(&self) -> &PacketSlot {
        &self.inbound
    }

    pub fn outbound(&self) -> &PacketSlot {
        &self.outbound
    }

    pub fn set_peer_connected(&self, connected: bool) {
        self.peer.store(connected, Ordering::Relaxed);
    }

    pub fn peer_connected(&self) -> bool {
        self.peer.load(Ordering::Relaxed)
    }

    /// The loop-side end of the channel.
    pub fn link(&self) -> PacketLink<'_> {
        PacketLink {
            channel: self,
            source: PacketSource::new(&self.inbound),
        }
    }
}

/// [`Link`](super::Link) over a [`PacketChannel`].
///
/// Written lines go to the outbound slot without a terminator; the radio
/// side adds whatever framing it sends with.
pub struct PacketLink<'a> {
    channel: &'a PacketChannel,
    source: PacketSource<'a>,
}

impl ByteSource for PacketLink<'_> {
    fn read_byte(&mut self) -> Option<u8> {
        self.source.read_byte()
    }
}

impl LineSink for PacketLink<'_> {
    fn is_connected(&self) -> bool {
        self.channel.peer_connected()
    }

    fn write_line(&mut self, line: &str) -> Result<(), LinkError> {
        if !self.channel.peer_connected() {
            return Err(LinkError::NotConnected);
        }
        self.channel
            .outbound
            .offer(line.as_bytes())
            .map_err(|e| match e {
                PacketError::TooLarge(_) => LinkError::TooLong,
                PacketError::Empty => LinkError::WriteFailed,
            })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::vec::Vec as StdVec;
    use std::sync::Arc;

    fn drain(source: &mut PacketSource<'_>) -> StdVec<u8> {
        core::iter::from_fn(|| source.read_byte()).collect()
    }

    #[test]
    fn empty_slot_yields_nothing() {
        let slot = PacketSlot::new();
        let mut source = PacketSource::new(&slot);
        assert_eq!(source.read_byte(), None);
    }

    #[test]
    fn packet_is_terminated_and_consumed_once() {
        let slot = PacketSlot::new();
        slot.offer(b"1,2,3,4,5").unwrap();
        assert!(slot.is_pending());

        let mut source = PacketSource::new(&slot);
        assert_eq!(drain(&mut source), b"1,2,3,4,5\n");
        assert!(!slot.is_pending());
        assert_eq!(source.read_byte(), None);
    }

    #[test]
    fn terminated_packet_is_left_alone() {
        let slot = PacketSlot::new();
        slot.offer(b"1,2,3,4,5\n").unwrap();
        let mut source = PacketSource::new(&slot);
        assert_eq!(drain(&mut source), b"1,2,3,4,5\n");
    }

    #[test]
    fn newer_packet_replaces_unconsumed_one() {
        let slot = PacketSlot::new();
        slot.offer(b"old").unwrap();
        slot.offer(b"new").unwrap();
        let mut source = PacketSource::new(&slot);
        assert_eq!(drain(&mut source), b"new\n");
    }

    #[test]
    fn rejects_empty_and_oversized_packets() {
        let slot = PacketSlot::new();
        assert_eq!(slot.offer(b""), Err(PacketError::Empty));
        let big = [b'x'; PACKET_CAPACITY];
        assert_eq!(slot.offer(&big), Err(PacketError::TooLarge(PACKET_CAPACITY)));
        assert!(!slot.is_pending());
    }

    #[test]
    fn hand_off_across_threads_is_whole() {
        let slot = Arc::new(PacketSlot::new());
        let producer = {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || {
                for i in 0..200u8 {
                    let packet = [b'0' + (i % 10); 64];
                    slot.offer(&packet).unwrap();
                }
            })
        };

        let mut seen = 0;
        while !producer.is_finished() || slot.is_pending() {
            if let Some(packet) = slot.take() {
                assert_eq!(packet.len(), 64);
                assert!(packet.iter().all(|&b| b == packet[0]));
                seen += 1;
            }
        }
        producer.join().unwrap();
        assert!(seen >= 1);
    }

    #[test]
    fn link_writes_only_with_a_peer() {
        let channel = PacketChannel::new();
        let mut link = channel.link();
        assert!(!link.is_connected());
        assert_eq!(link.write_line("CPU:1.00"), Err(LinkError::NotConnected));

        channel.set_peer_connected(true);
        link.write_line("CPU:1.00").unwrap();
        assert_eq!(channel.outbound().take().as_deref(), Some(&b"CPU:1.00"[..]));

        let long = "x".repeat(PACKET_CAPACITY);
        assert_eq!(link.write_line(&long), Err(LinkError::TooLong));
    }

    #[test]
    fn link_reads_inbound_packets() {
        let channel = PacketChannel::new();
        channel.inbound().offer(b"1,2,3,4,5").unwrap();
        let mut link = channel.link();
        let bytes: StdVec<u8> = core::iter::from_fn(|| link.read_byte()).collect();
        assert_eq!(bytes, b"1,2,3,4,5\n");
    }
}
