/// STL decoder for binary and ASCII formats.
///
/// Output is the flat coordinate sequence the scene ingests: 9 floats per
/// triangle, three vertices of x, y, z. Facet normals are dropped.
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::many0,
    number::complete::float,
    sequence::preceded,
    IResult,
};

use crate::error::{Error, Result};
use crate::scene::FLOATS_PER_TRIANGLE;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Decode a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Vec<f64>> {
    if data.len() < HEADER_LEN + 4 {
        return Err(Error::Stl("file too small to be a valid STL".to_string()));
    }

    let data = &data[HEADER_LEN..];
    let triangle_count = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let body = &data[4..];

    let needed = triangle_count
        .checked_mul(FACET_LEN)
        .ok_or_else(|| Error::Stl(format!("triangle count {triangle_count} overflows")))?;
    if body.len() < needed {
        return Err(Error::Stl(format!(
            "unexpected end of file: {triangle_count} triangles need {needed} bytes, found {}",
            body.len()
        )));
    }

    let mut coordinates = Vec::with_capacity(triangle_count * FLOATS_PER_TRIANGLE);
    for facet in body.chunks_exact(FACET_LEN).take(triangle_count) {
        // 12 bytes of normal, 36 bytes of vertices, 2 bytes of attributes
        for value in facet[12..48].chunks_exact(4) {
            let value = f32::from_le_bytes([value[0], value[1], value[2], value[3]]);
            coordinates.push(value as f64);
        }
    }

    Ok(coordinates)
}

/// Decode an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Vec<f64>> {
    match parse_ascii_stl_impl(input) {
        Ok((_, coordinates)) => Ok(coordinates),
        Err(e) => Err(Error::Stl(format!("failed to parse ASCII STL: {:?}", e))),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Vec<f64>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?; // Optional name
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;

    Ok((input, facets.concat()))
}

fn parse_facet(input: &str) -> IResult<&str, Vec<f64>> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;

    let mut coordinates = Vec::with_capacity(FLOATS_PER_TRIANGLE);
    let mut input = input;
    for _ in 0..3 {
        let (rest, (x, y, z)) = parse_vertex(input)?;
        coordinates.extend([x as f64, y as f64, z as f64]);
        input = rest;
    }

    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, coordinates))
}

fn parse_vertex(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    parse_vector3(input)
}

fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, (x, y, z)))
}

/// Detect and decode an STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Vec<f64>> {
    // Binary files may also start with "solid", so fall back to binary.
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(coordinates) = parse_ascii_stl(text) {
                return Ok(coordinates);
            }
        }
    }

    parse_binary_stl(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_stl(triangles: &[[f32; 9]]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for triangle in triangles {
            data.extend_from_slice(&[0u8; 12]);
            for value in triangle {
                data.extend_from_slice(&value.to_le_bytes());
            }
            data.extend_from_slice(&[0u8; 2]);
        }
        data
    }

    const TRIANGLE: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.5];

    #[test]
    fn test_parse_binary_header() {
        let mut data = vec![0u8; 84];
        data[80..84].copy_from_slice(&0u32.to_le_bytes());

        let coordinates = parse_binary_stl(&data).unwrap();
        assert!(coordinates.is_empty());
    }

    #[test]
    fn test_parse_binary_triangles() {
        let data = binary_stl(&[TRIANGLE, TRIANGLE]);
        let coordinates = parse_binary_stl(&data).unwrap();
        assert_eq!(coordinates.len(), 18);
        assert_eq!(&coordinates[..9], &TRIANGLE.map(f64::from)[..]);
    }

    #[test]
    fn test_binary_truncated_body_fails() {
        let mut data = binary_stl(&[TRIANGLE]);
        data.truncate(data.len() - 10);
        assert!(matches!(parse_binary_stl(&data), Err(Error::Stl(_))));
        assert!(parse_binary_stl(&[0u8; 20]).is_err());
    }

    #[test]
    fn test_parse_ascii_with_name() {
        let text = "solid cube\n\
            facet normal 0 0 1\n\
              outer loop\n\
                vertex 0 0 0\n\
                vertex 1 0 0\n\
                vertex 0 1 0.5\n\
              endloop\n\
            endfacet\n\
            endsolid cube\n";
        let coordinates = parse_ascii_stl(text).unwrap();
        assert_eq!(coordinates, TRIANGLE.map(f64::from).to_vec());
    }

    #[test]
    fn test_parse_stl_detects_format() {
        let ascii = b"solid\nfacet normal 0 0 1\nouter loop\n\
            vertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0.5\n\
            endloop\nendfacet\nendsolid\n";
        assert_eq!(parse_stl(ascii).unwrap().len(), 9);

        // Binary header that happens to start with "solid".
        let mut binary = binary_stl(&[TRIANGLE]);
        binary[..5].copy_from_slice(b"solid");
        assert_eq!(parse_stl(&binary).unwrap().len(), 9);
    }
}
