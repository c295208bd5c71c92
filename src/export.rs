//! Exporters for assembled blade sections: a minimal DXF R12 polyline
//! writer and a Tecplot-style tabular writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::blade::BladeSection;

/// Write one 3-d POLYLINE entity per section into an ENTITIES-only DXF.
pub fn write_dxf(path: &Path, sections: &[BladeSection]) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "0\nSECTION\n2\nENTITIES")?;
    for section in sections {
        let layer = format!("r{:.2}", section.radius);
        // 70 = 8: 3-d polyline; vertices carry flag 32
        writeln!(out, "0\nPOLYLINE\n8\n{layer}\n66\n1\n70\n8")?;
        for p in section.airfoil.scaled_coordinates() {
            writeln!(
                out,
                "0\nVERTEX\n8\n{layer}\n10\n{}\n20\n{}\n30\n{}\n70\n32",
                p.x, p.y, p.z
            )?;
        }
        writeln!(out, "0\nSEQEND")?;
    }
    writeln!(out, "0\nENDSEC\n0\nEOF")?;
    out.flush()
}

/// Write the sections as Tecplot zones of `x y z` rows.
pub fn write_tecplot(path: &Path, sections: &[BladeSection]) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "TITLE = \"blade sections\"")?;
    writeln!(out, "VARIABLES = \"x\" \"y\" \"z\"")?;
    for section in sections {
        writeln!(
            out,
            "ZONE T = \"{} r={:.3}\" I = {} F = POINT",
            section.name,
            section.radius,
            section.airfoil.scaled_coordinates().len()
        )?;
        for p in section.airfoil.scaled_coordinates() {
            writeln!(out, "{:.9e} {:.9e} {:.9e}", p.x, p.y, p.z)?;
        }
    }
    out.flush()
}
