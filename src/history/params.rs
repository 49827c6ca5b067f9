/// Time unit for historical bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarUnit {
    Minute,
    Daily,
    Weekly,
    Monthly,
}

impl BarUnit {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            BarUnit::Minute => "Minute",
            BarUnit::Daily => "Daily",
            BarUnit::Weekly => "Weekly",
            BarUnit::Monthly => "Monthly",
        }
    }

    /// Bars-per-day style multiplier used for request-size estimation,
    /// mirroring the heuristics behind the server's own per-call limits:
    /// minutes per day for intraday, approximate trading periods per year
    /// otherwise.
    pub(crate) fn period_multiplier(self) -> u64 {
        match self {
            BarUnit::Minute => 1440,
            BarUnit::Daily => 365,
            BarUnit::Weekly => 52,
            BarUnit::Monthly => 12,
        }
    }
}

/// U.S. equity session template. Ignored by the server for non-U.S. symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTemplate {
    UseqPre,
    UseqPost,
    UseqPreAndPost,
    Useq24Hour,
    Default,
}

impl SessionTemplate {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SessionTemplate::UseqPre => "USEQPre",
            SessionTemplate::UseqPost => "USEQPost",
            SessionTemplate::UseqPreAndPost => "USEQPreAndPost",
            SessionTemplate::Useq24Hour => "USEQ24Hour",
            SessionTemplate::Default => "Default",
        }
    }
}
