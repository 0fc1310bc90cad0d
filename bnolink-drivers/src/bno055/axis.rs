//! Axis remapping
//!
//! AXIS_MAP_CONFIG holds the source axis for each output axis in two-bit
//! fields; AXIS_MAP_SIGN flips individual output axes. The sensor ignores a
//! map that uses one source twice, so swapping two axes has to go through
//! [`Bno055::set_axis_mapping`] rather than two single remaps.

use bnolink_core::SerialLink;
use bnolink_hal::TickSource;
use embedded_hal::delay::DelayNs;

use super::{reg, Axis, AxisMapping, AxisSign, Bno055, Error, Page, Result};

const AXIS_FIELD_MASK: u8 = 0x03;

impl AxisMapping {
    /// Encode as (AXIS_MAP_CONFIG, AXIS_MAP_SIGN)
    pub fn to_registers(&self) -> (u8, u8) {
        let mut map = 0;
        let mut sign = 0;
        for (axis, (source, axis_sign)) in [Axis::X, Axis::Y, Axis::Z]
            .into_iter()
            .zip(self.source.iter().zip(self.sign.iter()))
        {
            map |= (*source as u8) << axis.map_shift();
            if *axis_sign == AxisSign::Negative {
                sign |= axis.sign_bit();
            }
        }
        (map, sign)
    }
}

impl<L, C, D> Bno055<L, C, D>
where
    L: SerialLink,
    C: TickSource,
    D: DelayNs,
{
    pub fn axis_mapping(&mut self) -> Result<AxisMapping> {
        self.select_page(Page::Zero)?;
        let map = self.read_byte(reg::AXIS_MAP_CONFIG)?;
        let sign = self.read_byte(reg::AXIS_MAP_SIGN)?;
        AxisMapping::from_registers(map, sign).ok_or(Error::UnexpectedValue(map))
    }

    /// Feed output axis `target` from sensor axis `source`
    pub fn remap_axis(&mut self, target: Axis, source: Axis) -> Result<()> {
        self.select_page(Page::Zero)?;
        let map = self.read_byte(reg::AXIS_MAP_CONFIG)?;
        let shift = target.map_shift();
        if (map >> shift) & AXIS_FIELD_MASK == source as u8 {
            return Ok(());
        }

        self.with_config_mode(|dev| {
            dev.select_page(Page::Zero)?;
            dev.update_bits(
                reg::AXIS_MAP_CONFIG,
                AXIS_FIELD_MASK << shift,
                (source as u8) << shift,
            )
        })
    }

    pub fn set_axis_sign(&mut self, axis: Axis, sign: AxisSign) -> Result<()> {
        self.select_page(Page::Zero)?;
        let current = self.read_byte(reg::AXIS_MAP_SIGN)?;
        let bit = axis.sign_bit();
        let negative = sign == AxisSign::Negative;
        if (current & bit != 0) == negative {
            return Ok(());
        }

        self.with_config_mode(|dev| {
            dev.select_page(Page::Zero)?;
            dev.update_bits(reg::AXIS_MAP_SIGN, bit, if negative { bit } else { 0 })
        })
    }

    /// Write the complete mapping and signs at once
    pub fn set_axis_mapping(&mut self, mapping: &AxisMapping) -> Result<()> {
        let (map, sign) = mapping.to_registers();
        self.with_config_mode(|dev| {
            dev.select_page(Page::Zero)?;
            dev.write_byte(reg::AXIS_MAP_CONFIG, map)?;
            dev.write_byte(reg::AXIS_MAP_SIGN, sign)
        })
    }
}
