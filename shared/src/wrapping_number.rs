use crate::SequenceNumber;

/// Returns whether or not a wrapping sequence number is newer than another.
/// Numbers less than half the range ahead count as newer, so the comparison
/// keeps working after the counter wraps around.
/// sequence_greater_than(2,1) will return true
/// sequence_greater_than(1,2) will return false
/// sequence_greater_than(1,1) will return false
/// sequence_greater_than(0,65535) will return true
pub fn sequence_greater_than(s1: SequenceNumber, s2: SequenceNumber) -> bool {
    const HALF: SequenceNumber = SequenceNumber::MAX / 2 + 1;
    ((s1 > s2) && (s1 - s2 <= HALF)) || ((s1 < s2) && (s2 - s1 > HALF))
}

/// sequence_less_than(1,2) will return true
/// sequence_less_than(2,1) will return false
pub fn sequence_less_than(s1: SequenceNumber, s2: SequenceNumber) -> bool {
    sequence_greater_than(s2, s1)
}
