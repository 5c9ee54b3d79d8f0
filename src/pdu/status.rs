/// https://smpp.org/SMPP_v3_4_Issue1_2.pdf section 5.1.3
///
/// The command_status values the gateway produces or reports on.
#[repr(u32)]
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive)]
pub enum PduStatus {
    ESME_ROK = 0x00000000,
    ESME_RINVMSGLEN = 0x00000001,
    ESME_RINVCMDLEN = 0x00000002,
    ESME_RINVCMDID = 0x00000003,
    ESME_RINVBNDSTS = 0x00000004,
    ESME_RALYBND = 0x00000005,
    ESME_RSYSERR = 0x00000008,
    ESME_RINVSRCADR = 0x0000000A,
    ESME_RINVDSTADR = 0x0000000B,
    ESME_RBINDFAIL = 0x0000000D,
    ESME_RINVPASWD = 0x0000000E,
    ESME_RINVSYSID = 0x0000000F,
    ESME_RMSGQFUL = 0x00000014,
    ESME_RTHROTTLED = 0x00000058,
    ESME_RX_T_APPN = 0x00000064,
}

impl PduStatus {
    /// A readable name for a raw command_status, for log lines.
    pub fn describe(command_status: u32) -> String {
        match <Self as num_traits::FromPrimitive>::from_u32(command_status) {
            Some(status) => format!("{:?}", status),
            None => format!("{:#010X}", command_status),
        }
    }
}
