//! Type classification flags.
//!
//! Every entry in the type table carries a flags word so that broad
//! category checks (is this a union? a literal? nullable?) do not need to
//! match on the full type kind.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        const UNKNOWN             = 1 << 0;
        const NEVER               = 1 << 1;
        const STRING              = 1 << 2;
        const NUMBER              = 1 << 3;
        const BOOLEAN             = 1 << 4;
        const NULL                = 1 << 5;
        const UNDEFINED           = 1 << 6;
        const VOID                = 1 << 7;
        const STRING_LITERAL      = 1 << 8;
        const NUMBER_LITERAL      = 1 << 9;
        const BOOLEAN_LITERAL     = 1 << 10;
        const OBJECT              = 1 << 11;
        const UNION               = 1 << 12;
        const INTERSECTION        = 1 << 13;
        const FUNCTION            = 1 << 14;
        const CLASS               = 1 << 15;
        const CLASS_CONSTRUCTOR   = 1 << 16;
        const ARRAY               = 1 << 17;
        const READONLY            = 1 << 18;
        const TYPE_PARAMETER      = 1 << 19;
        const GENERIC_APPLICATION = 1 << 20;

        const LITERAL = Self::STRING_LITERAL.bits()
            | Self::NUMBER_LITERAL.bits()
            | Self::BOOLEAN_LITERAL.bits();
        const STRING_LIKE = Self::STRING.bits() | Self::STRING_LITERAL.bits();
        const NUMBER_LIKE = Self::NUMBER.bits() | Self::NUMBER_LITERAL.bits();
        const BOOLEAN_LIKE = Self::BOOLEAN.bits() | Self::BOOLEAN_LITERAL.bits();
        const PRIMITIVE = Self::STRING.bits()
            | Self::NUMBER.bits()
            | Self::BOOLEAN.bits()
            | Self::NULL.bits()
            | Self::UNDEFINED.bits()
            | Self::VOID.bits()
            | Self::LITERAL.bits();
        const NULLABLE = Self::NULL.bits() | Self::UNDEFINED.bits();
        const UNION_OR_INTERSECTION = Self::UNION.bits() | Self::INTERSECTION.bits();
        const NOMINAL = Self::CLASS.bits() | Self::CLASS_CONSTRUCTOR.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_flags() {
        assert!(TypeFlags::LITERAL.contains(TypeFlags::NUMBER_LITERAL));
        assert!(TypeFlags::PRIMITIVE.contains(TypeFlags::STRING_LITERAL));
        assert!(!TypeFlags::PRIMITIVE.contains(TypeFlags::OBJECT));
        assert!(TypeFlags::NOMINAL.contains(TypeFlags::CLASS));
    }
}
