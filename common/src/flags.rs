use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Declare a bit mask type whose wire form is the plain integer mask.
/// Unknown bits are retained so a mask read from the service is written back unchanged
macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        $name:ident: $repr:ty {
            $( $flag:ident = $value:expr => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($repr);

        impl $name {
            $( pub const $flag: $name = $name($value); )+

            const NAMED: &'static [($name, &'static str)] = &[ $( ($name::$flag, $label), )+ ];

            pub const fn empty() -> $name {
                $name(0)
            }

            pub const fn from_bits(bits: $repr) -> $name {
                $name(bits)
            }

            pub const fn bits(&self) -> $repr {
                self.0
            }

            pub const fn is_empty(&self) -> bool {
                self.0 == 0
            }

            /// True when every bit of `other` is set
            pub const fn contains(&self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }

            pub fn insert(&mut self, other: $name) {
                self.0 |= other.0;
            }

            pub fn remove(&mut self, other: $name) {
                self.0 &= !other.0;
            }

            /// Names of the known flags that are set, lowest bit first
            pub fn names(&self) -> Vec<String> {
                $name::NAMED
                    .iter()
                    .filter(|(flag, _)| self.contains(*flag))
                    .map(|(_, label)| label.to_string())
                    .collect()
            }
        }

        impl BitOr for $name {
            type Output = $name;

            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: $name) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $name {
            type Output = $name;

            fn bitand(self, rhs: $name) -> $name {
                $name(self.0 & rhs.0)
            }
        }
    };
}

flag_set! {
    /// Days of the week a weekly or monthly day-of-week trigger fires on
    DaysOfWeek: u16 {
        SUNDAY = 0x1 => "Sunday",
        MONDAY = 0x2 => "Monday",
        TUESDAY = 0x4 => "Tuesday",
        WEDNESDAY = 0x8 => "Wednesday",
        THURSDAY = 0x10 => "Thursday",
        FRIDAY = 0x20 => "Friday",
        SATURDAY = 0x40 => "Saturday",
    }
}

flag_set! {
    /// Days of the month a monthly trigger fires on. `LAST` is the last day of any month
    DaysOfMonth: u32 {
        FIRST = 0x1 => "1",
        SECOND = 0x2 => "2",
        THIRD = 0x4 => "3",
        FOURTH = 0x8 => "4",
        FIFTH = 0x10 => "5",
        SIXTH = 0x20 => "6",
        SEVENTH = 0x40 => "7",
        EIGHTH = 0x80 => "8",
        NINTH = 0x100 => "9",
        TENTH = 0x200 => "10",
        ELEVENTH = 0x400 => "11",
        TWELFTH = 0x800 => "12",
        THIRTEENTH = 0x1000 => "13",
        FOURTEENTH = 0x2000 => "14",
        FIFTEENTH = 0x4000 => "15",
        SIXTEENTH = 0x8000 => "16",
        SEVENTEENTH = 0x10000 => "17",
        EIGHTEENTH = 0x20000 => "18",
        NINETEENTH = 0x40000 => "19",
        TWENTIETH = 0x80000 => "20",
        TWENTY_FIRST = 0x100000 => "21",
        TWENTY_SECOND = 0x200000 => "22",
        TWENTY_THIRD = 0x400000 => "23",
        TWENTY_FOURTH = 0x800000 => "24",
        TWENTY_FIFTH = 0x1000000 => "25",
        TWENTY_SIXTH = 0x2000000 => "26",
        TWENTY_SEVENTH = 0x4000000 => "27",
        TWENTY_EIGHTH = 0x8000000 => "28",
        TWENTY_NINTH = 0x10000000 => "29",
        THIRTIETH = 0x20000000 => "30",
        THIRTY_FIRST = 0x40000000 => "31",
        LAST = 0x80000000 => "Last",
    }
}

impl DaysOfMonth {
    /// Flag for a single calendar day (1 to 31)
    pub fn day(day: u8) -> Option<DaysOfMonth> {
        if !(1..=31).contains(&day) {
            return None;
        }
        Some(DaysOfMonth(1 << (day - 1)))
    }
}

flag_set! {
    MonthsOfYear: u16 {
        JANUARY = 0x1 => "January",
        FEBRUARY = 0x2 => "February",
        MARCH = 0x4 => "March",
        APRIL = 0x8 => "April",
        MAY = 0x10 => "May",
        JUNE = 0x20 => "June",
        JULY = 0x40 => "July",
        AUGUST = 0x80 => "August",
        SEPTEMBER = 0x100 => "September",
        OCTOBER = 0x200 => "October",
        NOVEMBER = 0x400 => "November",
        DECEMBER = 0x800 => "December",
    }
}

impl MonthsOfYear {
    pub const ALL: MonthsOfYear = MonthsOfYear(0xfff);
}

flag_set! {
    WeeksOfMonth: u16 {
        FIRST = 0x1 => "First",
        SECOND = 0x2 => "Second",
        THIRD = 0x4 => "Third",
        FOURTH = 0x8 => "Fourth",
    }
}

flag_set! {
    /// How a task definition is registered
    CreationFlags: u32 {
        VALIDATE_ONLY = 0x1 => "ValidateOnly",
        CREATE = 0x2 => "Create",
        UPDATE = 0x4 => "Update",
        DISABLE = 0x8 => "Disable",
        DONT_ADD_PRINCIPAL_ACE = 0x10 => "DontAddPrincipalAce",
        IGNORE_REGISTRATION_TRIGGERS = 0x20 => "IgnoreRegistrationTriggers",
    }
}

impl CreationFlags {
    pub const CREATE_OR_UPDATE: CreationFlags = CreationFlags(0x2 | 0x4);
}

flag_set! {
    RunFlags: u32 {
        AS_SELF = 0x1 => "AsSelf",
        IGNORE_CONSTRAINTS = 0x2 => "IgnoreConstraints",
        USE_SESSION_ID = 0x4 => "UseSessionId",
        USER_SID = 0x8 => "UserSid",
    }
}

flag_set! {
    /// Parts of a security descriptor to read or write
    SecurityInformation: u32 {
        OWNER = 0x1 => "Owner",
        GROUP = 0x2 => "Group",
        DACL = 0x4 => "Dacl",
        SACL = 0x8 => "Sacl",
        LABEL = 0x10 => "Label",
    }
}

flag_set! {
    /// Enumeration options for folder and running task listings
    EnumFlags: u32 {
        HIDDEN = 0x1 => "Hidden",
    }
}

#[cfg(test)]
mod tests {
    use super::{CreationFlags, DaysOfMonth, DaysOfWeek, MonthsOfYear, WeeksOfMonth};

    #[test]
    fn test_days_of_week_union() {
        let days = DaysOfWeek::MONDAY | DaysOfWeek::FRIDAY;
        assert_eq!(days.bits(), 0x22);
        assert!(days.contains(DaysOfWeek::MONDAY));
        assert!(!days.contains(DaysOfWeek::SUNDAY));
        assert_eq!(days.names(), vec!["Monday", "Friday"]);
    }

    #[test]
    fn test_insert_remove() {
        let mut months = MonthsOfYear::empty();
        assert!(months.is_empty());

        months.insert(MonthsOfYear::MARCH);
        months |= MonthsOfYear::JUNE;
        months.remove(MonthsOfYear::MARCH);
        assert_eq!(months, MonthsOfYear::JUNE);
        assert!(MonthsOfYear::ALL.contains(MonthsOfYear::DECEMBER));
    }

    #[test]
    fn test_days_of_month_day() {
        assert_eq!(DaysOfMonth::day(1), Some(DaysOfMonth::FIRST));
        assert_eq!(DaysOfMonth::day(31), Some(DaysOfMonth::THIRTY_FIRST));
        assert_eq!(DaysOfMonth::day(0), None);
        assert_eq!(DaysOfMonth::day(32), None);
        assert_eq!(DaysOfMonth::LAST.bits(), 0x80000000);
    }

    #[test]
    fn test_unknown_bits_retained() {
        let weeks = WeeksOfMonth::from_bits(0x31);
        assert_eq!(weeks.bits(), 0x31);
        assert_eq!(weeks.names(), vec!["First"]);
    }

    #[test]
    fn test_create_or_update() {
        assert!(CreationFlags::CREATE_OR_UPDATE.contains(CreationFlags::CREATE));
        assert!(CreationFlags::CREATE_OR_UPDATE.contains(CreationFlags::UPDATE));
        assert_eq!(
            (CreationFlags::CREATE_OR_UPDATE & CreationFlags::UPDATE).bits(),
            0x4
        );
    }

    #[test]
    fn test_serialize_as_mask() {
        let days = DaysOfWeek::SUNDAY | DaysOfWeek::SATURDAY;
        assert_eq!(serde_json::to_string(&days).unwrap(), "65");
    }
}
