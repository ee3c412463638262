//
// revcp-rs is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License  v3
// as published by the Free Software Foundation.
//
// revcp-rs is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY.
// See the GNU Lesser General Public License  for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with revcp-rs. If not, see http://www.gnu.org/licenses/lgpl-3.0.en.html
//
// Copyright (c)  2022 by X. Gillard
//

//! This module contains utilities that allows one to be generic over the
//! primitive types a stored primitive can hold. All of them are encoded on a
//! 64 bits word so that the environment can keep a single homogeneous array
//! of values (and a single trail) whatever the type of the managed data.

use std::ops::{Add, Sub};

/// A scalar is a primitive value which can be saved on the trail.
pub trait Scalar: Sized + Copy + PartialEq + std::fmt::Debug + private::Sealed {
    /// Encodes this value on a 64 bits word
    fn to_bits(self) -> u64;
    /// Decodes a value that has previously been encoded with `to_bits`
    fn from_bits(bits: u64) -> Self;
}

/// An integral scalar supports the increment and decrement operations
pub trait Integral: Scalar + Add<Output = Self> + Sub<Output = Self> + Ord {
    /// Returns the one value of this type
    fn one() -> Self;
}

/// This macro generates an implementation of the Scalar and Integral traits
/// for the given signed type $t
macro_rules! integral {
    ($t: ty) => {
        impl Scalar for $t {
            #[inline]
            fn to_bits(self) -> u64 {
                self as i64 as u64
            }
            #[inline]
            fn from_bits(bits: u64) -> $t {
                bits as i64 as $t
            }
        }
        impl Integral for $t {
            fn one() -> $t {
                1
            }
        }
    };
}

integral!(i32);
integral!(i64);

impl Scalar for bool {
    #[inline]
    fn to_bits(self) -> u64 {
        self as u64
    }
    #[inline]
    fn from_bits(bits: u64) -> bool {
        bits != 0
    }
}

impl Scalar for f64 {
    #[inline]
    fn to_bits(self) -> u64 {
        f64::to_bits(self)
    }
    #[inline]
    fn from_bits(bits: u64) -> f64 {
        f64::from_bits(bits)
    }
}

mod private {
    /// This is a marker trait which simply cannot be implemented outside of
    /// this module which prevents anyone from implementing it. The
    /// environment only knows how to save 64 bits words: every scalar type
    /// must be explicitly listed here.
    pub trait Sealed {}

    macro_rules! sealed {
        ($t: ty) => {
            impl Sealed for $t {}
        };
    }

    sealed!(i32);
    sealed!(i64);
    sealed!(bool);
    sealed!(f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_integers_survive_the_encoding() {
        assert_eq!(-42, i32::from_bits((-42_i32).to_bits()));
        assert_eq!(i64::MIN, i64::from_bits(i64::MIN.to_bits()));
        assert_eq!(i32::MIN, i32::from_bits(i32::MIN.to_bits()));
    }

    #[test]
    fn booleans_are_zero_or_one() {
        assert_eq!(0, false.to_bits());
        assert_eq!(1, true.to_bits());
        assert!(bool::from_bits(1));
        assert!(!bool::from_bits(0));
    }

    #[test]
    fn doubles_keep_their_exact_bits() {
        let x = -0.1_f64;
        assert_eq!(x, <f64 as Scalar>::from_bits(Scalar::to_bits(x)));
    }
}
