use std::io::Write;

use crate::config::OutputFormat;
use crate::engine::OutputTensor;

pub fn print_output<W: Write + ?Sized>(
    out: &mut W,
    tensor: &OutputTensor,
    format: OutputFormat,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Plain => {
            writeln!(out, "Output tensor: ")?;
            for value in tensor.as_slice() {
                write!(out, "{value:.6}, ")?;
            }
            writeln!(out)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, tensor)?;
            writeln!(out)?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod test {
    use super::*;

    fn render(tensor: &OutputTensor, format: OutputFormat) -> String {
        let mut buf = vec![];
        print_output(&mut buf, tensor, format).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn plain() {
        let t = OutputTensor::new(vec![1, 3], vec![0.25, 0.5, 0.125]);
        assert_eq!(render(&t, OutputFormat::Plain), "Output tensor: \n0.250000, 0.500000, 0.125000, \n");
    }

    #[test]
    fn json() {
        let t = OutputTensor::new(vec![2], vec![1.0, 0.5]);
        let v: serde_json::Value = serde_json::from_str(&render(&t, OutputFormat::Json)).unwrap();
        assert_eq!(v["shape"], serde_json::json!([2]));
        assert_eq!(v["values"], serde_json::json!([1.0, 0.5]));
    }

    #[test]
    fn one_value_per_element() {
        let t = OutputTensor::new(vec![1, 1000], vec![0.001; 1000]);
        let text = render(&t, OutputFormat::Plain);
        assert_eq!(text.lines().nth(1).unwrap().matches(", ").count(), 1000);
    }
}
