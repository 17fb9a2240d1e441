/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Aggregate bar periods (`/range/{multiplier}/{timespan}` route segments)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Unit of an aggregate period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodBasis {
  /// One minute
  Minute,
  /// One hour
  Hour,
  /// One calendar day
  Day,
  /// One week
  Week,
  /// One calendar month
  Month,
  /// Three calendar months
  Quarter,
  /// One calendar year
  Year,
}

impl PeriodBasis {
  /// Lower-case name used as a path segment
  pub fn as_str(&self) -> &'static str {
    match self {
      PeriodBasis::Minute => "minute",
      PeriodBasis::Hour => "hour",
      PeriodBasis::Day => "day",
      PeriodBasis::Week => "week",
      PeriodBasis::Month => "month",
      PeriodBasis::Quarter => "quarter",
      PeriodBasis::Year => "year",
    }
  }
}

impl std::fmt::Display for PeriodBasis {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A bar size such as "3 weeks": a positive multiple of a [`PeriodBasis`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct Period {
  multiple: u32,
  basis: PeriodBasis,
}

/// Unchecked wire shape, validated through [`Period::new`]
#[derive(Deserialize)]
struct RawPeriod {
  multiple: u32,
  basis: PeriodBasis,
}

impl TryFrom<RawPeriod> for Period {
  type Error = Error;

  fn try_from(raw: RawPeriod) -> Result<Self> {
    Period::new(raw.multiple, raw.basis)
  }
}

impl Period {
  /// Create a period, rejecting a zero multiple
  pub fn new(multiple: u32, basis: PeriodBasis) -> Result<Self> {
    if multiple == 0 {
      return Err(Error::Config(format!("Period multiple must be positive (basis {})", basis)));
    }
    Ok(Self { multiple, basis })
  }

  /// Number of basis units, always positive
  pub fn multiple(&self) -> u32 {
    self.multiple
  }

  /// Unit the multiple applies to
  pub fn basis(&self) -> PeriodBasis {
    self.basis
  }
}

impl std::fmt::Display for Period {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {:?}", self.multiple, self.basis)
  }
}
