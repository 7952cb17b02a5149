use anyhow::Context;
use byteorder::LE;
use byteorder::WriteBytesExt;
use std::io::Write;

/// a numpy `.npy` version 1.0 array dump of little-endian f32 data.
/// layout: the magic string and version, a u16 header length, the
/// python dict header padded with spaces to a 64-byte boundary and
/// terminated by a newline, then the raw C-order payload.
/// https://numpy.org/doc/stable/reference/generated/numpy.lib.format.html
pub struct Npy {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Npy {
    /// magic string followed by format version 1.0
    const MAGIC: &'static [u8] = b"\x93NUMPY\x01\x00";

    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Self {
        debug_assert!(shape.iter().product::<usize>() == data.len());
        Self { shape, data }
    }

    /// the dict header, space-padded so the payload starts on a
    /// 64-byte boundary
    fn header(&self) -> Vec<u8> {
        let shape = match self.shape.as_slice() {
            [only] => format!("({},)", only),
            dims => format!(
                "({})",
                dims.iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };
        let dict = format!(
            "{{'descr': '<f4', 'fortran_order': False, 'shape': {}, }}",
            shape
        );
        let unpadded = Self::MAGIC.len() + 2 + dict.len() + 1;
        let padding = (64 - unpadded % 64) % 64;
        let mut header = dict.into_bytes();
        header.resize(header.len() + padding, b' ');
        header.push(b'\n');
        header
    }

    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("create array dump {}", path.display()))?;
        let mut writer = std::io::BufWriter::new(file);
        let header = self.header();
        writer.write_all(Self::MAGIC)?;
        writer.write_u16::<LE>(header.len() as u16)?;
        writer.write_all(&header)?;
        for &value in &self.data {
            writer.write_f32::<LE>(value)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("gridzero_npy_{}_{}", std::process::id(), name))
    }

    #[test]
    fn layout_matches_the_format_spec() {
        let path = scratch("layout");
        Npy::new(vec![2, 3], (0..6).map(|x| x as f32).collect())
            .save(&path)
            .expect("writes");
        let bytes = std::fs::read(&path).expect("reads");
        assert!(bytes.starts_with(b"\x93NUMPY\x01\x00"));
        let length = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert!((10 + length) % 64 == 0);
        let header = std::str::from_utf8(&bytes[10..10 + length]).expect("ascii header");
        assert!(header.contains("'descr': '<f4'"));
        assert!(header.contains("'fortran_order': False"));
        assert!(header.contains("'shape': (2, 3)"));
        assert!(header.ends_with('\n'));
        assert!(bytes.len() == 10 + length + 6 * 4);
        let third = f32::from_le_bytes(bytes[10 + length + 8..10 + length + 12].try_into().expect("four bytes"));
        assert!(third == 2.0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn one_dimensional_shapes_keep_the_trailing_comma() {
        let path = scratch("vector");
        Npy::new(vec![4], vec![1.0, -1.0, 0.0, 1.0])
            .save(&path)
            .expect("writes");
        let bytes = std::fs::read(&path).expect("reads");
        let length = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        let header = std::str::from_utf8(&bytes[10..10 + length]).expect("ascii header");
        assert!(header.contains("'shape': (4,)"));
        std::fs::remove_file(&path).ok();
    }
}
