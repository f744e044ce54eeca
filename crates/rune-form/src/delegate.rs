use crate::bag::ValueBag;
use crate::options::OptionSet;

/// Host-supplied hooks. The core never validates submissions or fetches
/// option data itself.
pub trait FormDelegate {
    /// Whether the current aggregate values may be submitted.
    fn can_submit(&self, values: &ValueBag) -> bool {
        let _ = values;
        true
    }

    /// Option data for a field's `optionMapName`, resolved lazily.
    fn option_map(&self, name: &str) -> Option<OptionSet> {
        let _ = name;
        None
    }
}
