use bitstream_io::{BigEndian, BitWrite, BitWriter};

/// Bit order within one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// most significant bit first, the wire default
    MsbFirst,
    /// least significant bit first
    LsbFirst,
}

/// Iterates over the individual bits of a byte slice.
///
/// The payload bit stream is MSB-first per byte; [`BitOrder::LsbFirst`] is
/// available for callers that need the reverse walk.
pub struct BitIterator<'a> {
    data: &'a [u8],
    order: BitOrder,
    byte: usize,
    bit: u8,
}

impl<'a> BitIterator<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_order(data, BitOrder::MsbFirst)
    }

    pub fn with_order(data: &'a [u8], order: BitOrder) -> Self {
        Self {
            data,
            order,
            byte: 0,
            bit: 0,
        }
    }

    /// Number of bits not yet consumed.
    pub fn remaining(&self) -> usize {
        (self.data.len() - self.byte) * 8 - self.bit as usize
    }
}

impl Iterator for BitIterator<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        let byte = *self.data.get(self.byte)?;
        let shift = match self.order {
            BitOrder::MsbFirst => 7 - self.bit,
            BitOrder::LsbFirst => self.bit,
        };
        self.bit += 1;
        if self.bit == 8 {
            self.bit = 0;
            self.byte += 1;
        }
        Some((byte >> shift) & 1)
    }
}

/// Packs a bit stream back into bytes, MSB-first.
///
/// Trailing bits that do not fill a whole byte are dropped, mirroring the
/// embed side which only ever writes whole payload bytes.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    let mut writer = BitWriter::endian(Vec::with_capacity(bits.len() / 8), BigEndian);
    for bit in bits {
        writer
            .write_bit(*bit & 1 == 1)
            .expect("writing into a Vec cannot fail");
    }
    writer.into_writer()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_iterate_msb_first() {
        let bits: Vec<u8> = BitIterator::new(&[0b1011_0001]).collect();
        assert_eq!(bits, vec![1, 0, 1, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn should_iterate_lsb_first() {
        let bits: Vec<u8> = BitIterator::with_order(&[0b1011_0001], BitOrder::LsbFirst).collect();
        assert_eq!(bits, vec![1, 0, 0, 0, 1, 1, 0, 1]);
    }

    #[test]
    fn should_report_remaining_bits() {
        let mut iter = BitIterator::new(&[0xff, 0x00]);
        assert_eq!(iter.remaining(), 16);
        iter.next();
        iter.next();
        iter.next();
        assert_eq!(iter.remaining(), 13);
    }

    #[test]
    fn should_pack_bits_into_bytes() {
        let bits = [1, 0, 1, 1, 0, 0, 0, 1, 0, 0, 0, 0, 1, 1, 1, 1];
        assert_eq!(bits_to_bytes(&bits), vec![0b1011_0001, 0b0000_1111]);
    }

    #[test]
    fn should_drop_trailing_partial_byte() {
        let bits = [1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1];
        assert_eq!(bits_to_bytes(&bits), vec![0xff]);
    }

    #[test]
    fn should_round_trip_through_bits() {
        let data = b"stegopix";
        let bits: Vec<u8> = BitIterator::new(data).collect();
        assert_eq!(bits_to_bytes(&bits), data.to_vec());
    }
}
