use crate::container::directory::ParameterDirectory;
use crate::container::header::Header;
use crate::container::parameter::{Parameter, ParameterData};
use crate::util::words::char_text;
use std::io::Write;

const DATA_INDENT: &str = "\t\t                ";

pub fn write_header(h: &Header, mut w: impl Write) -> std::io::Result<()> {
    writeln!(w, "parameter_block = {}", h.parameter_block)?;
    writeln!(w, "ADTech_ID_number = {}", h.id_number)?;
    writeln!(w, "Number_of_Points = {}", h.points)?;
    writeln!(w, "Number_of_Analog_data = {}", h.analog)?;
    writeln!(w, "First_Frame = {}", h.first_frame)?;
    writeln!(w, "Last_Frame = {}", h.last_frame)?;
    writeln!(w, "Max_Interpolation_Gap = {}", h.max_interpolation_gap)?;
    writeln!(w, "Point_Scale_Factor = {:.4}", h.scale_factor)?;
    writeln!(w, "Data_Start_Block = {}", h.data_start_block)?;
    writeln!(w, "Analog_Per_Frame = {}", h.analog_per_frame)?;
    writeln!(w, "Frame_Rate = {:.4} Hz", h.frame_rate)?;
    for (i, v) in h.reserved_1.iter().enumerate() {
        writeln!(w, "Future_use_block_[{}] = {}", i + 1, v)?;
    }
    writeln!(w, "Key_Value_1 = {}", h.key_value_1)?;
    writeln!(w, "First_label_Range_Block = {}", h.first_label_range_block)?;
    writeln!(w, "Key_Value_2 = {}", h.key_value_2)?;
    writeln!(w, "Event_Time_Num = {}", h.event_time_num)?;
    writeln!(w, "Future_use_block = {}", h.reserved_2)?;
    for t in &h.event_times {
        writeln!(w, "Event_Time = {:.6} sec", t)?;
    }
    for f in &h.event_display_flags {
        writeln!(w, "Event_Display_Flag = {}", f)?;
    }
    writeln!(w, "Future_use_block = {}", h.reserved_3)?;
    for i in 0..h.event_labels.len() {
        writeln!(w, "Event_Label_[{}] = {}", i + 1, h.event_label(i))?;
    }
    for (i, v) in h.reserved_4.iter().enumerate() {
        writeln!(w, "Future_use_block_[{}] = {}", i + 1, v)?;
    }
    Ok(())
}

fn locked(l: bool) -> &'static str {
    if l { "TRUE" } else { "FALSE" }
}

fn write_values<T>(w: &mut impl Write, values: &[T], fmt: impl Fn(&T) -> String) -> std::io::Result<()> {
    if values.is_empty() {
        return writeln!(w);
    }
    for (i, v) in values.iter().enumerate() {
        if i == 0 {
            writeln!(w, "{}", fmt(v))?;
        } else {
            writeln!(w, "{DATA_INDENT}{}", fmt(v))?;
        }
    }
    Ok(())
}

fn write_parameter(p: &Parameter, w: &mut impl Write) -> std::io::Result<()> {
    writeln!(w, "\t\tParameter_Name = {}", p.name)?;
    writeln!(w, "\t\tParameter_ID = {}", p.id)?;
    writeln!(w, "\t\tIsLocked = {}", locked(p.locked))?;
    writeln!(w, "\t\tByte_Format = {}", p.format().name())?;
    writeln!(w, "\t\tNumber_Of_Dimensions = {}", p.dimensions.len())?;
    let dims = if p.dimensions.is_empty() {
        "0".to_string()
    } else {
        p.dimensions
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(" x ")
    };
    writeln!(w, "\t\tDimension_Sizes = {dims}")?;

    write!(w, "\t\tParameter_Data: ")?;
    match &p.data {
        ParameterData::Char(v) => {
            let s = char_text(v);
            writeln!(w, "{s}")?;
            if s == " " {
                writeln!(w)?;
            }
        }
        ParameterData::Byte(v) => write_values(w, v, |b| format!("{b:5}"))?,
        ParameterData::Int16(v) => write_values(w, v, |i| format!("{i:5}"))?,
        ParameterData::Float(v) => write_values(w, v, |f| format!("{f:8.4}"))?,
    }
    writeln!(w, "\t\tDescription = {}\n", p.description)
}

pub fn write_parameters(dir: &ParameterDirectory, mut w: impl Write) -> std::io::Result<()> {
    writeln!(w, "Parameter_Block_Start = {}", dir.header.parameter_block)?;
    writeln!(w, "ADTech_ID_Number = {}", dir.header.id_number)?;
    writeln!(w, "Parameter_512_byte_Block = {}", dir.header.block_count)?;
    writeln!(w, "Processor_Type = {}", dir.header.processor_type)?;
    writeln!(w, "\n")?;

    for g in &dir.groups {
        writeln!(w, "Group_Name = {}", g.name)?;
        writeln!(w, "Group_ID = {}", g.id)?;
        writeln!(w, "IsLocked = {}", locked(g.locked))?;
        writeln!(w, "Description = {}\n", g.description)?;
        for p in &g.parameters {
            write_parameter(p, &mut w)?;
        }
    }
    Ok(())
}
