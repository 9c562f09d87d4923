// Layout conformance tests for the structs the control path hands across
// the C boundary. Sizes, alignments and field offsets are printed as well
// as asserted to aid debugging when a mismatch shows up on a platform.
use dmxp_msgq::MSGQ::Structs::{IpcPerm, MsgInfo, MsqidDs};
use memoffset::offset_of;
use std::mem::{align_of, size_of};

#[test]
fn test_ipc_perm_layout() {
    let size = size_of::<IpcPerm>();
    let align = align_of::<IpcPerm>();
    println!(
        "IpcPerm => size: {size}, align: {align}, offsets: [key:{}, uid:{}, gid:{}, cuid:{}, cgid:{}, mode:{}]",
        offset_of!(IpcPerm, key),
        offset_of!(IpcPerm, uid),
        offset_of!(IpcPerm, gid),
        offset_of!(IpcPerm, cuid),
        offset_of!(IpcPerm, cgid),
        offset_of!(IpcPerm, mode),
    );

    assert_eq!(size, 24);
    assert_eq!(align, 4);
    assert_eq!(offset_of!(IpcPerm, key), 0);
    assert_eq!(offset_of!(IpcPerm, uid), 4);
    assert_eq!(offset_of!(IpcPerm, gid), 8);
    assert_eq!(offset_of!(IpcPerm, cuid), 12);
    assert_eq!(offset_of!(IpcPerm, cgid), 16);
    assert_eq!(offset_of!(IpcPerm, mode), 20);
    assert_eq!(offset_of!(IpcPerm, _pad), 22);
}

#[test]
fn test_msqid_ds_layout() {
    // perm (24) + 3 x i64 times + 3 x u64 counters + 2 x i32 pids
    let raw = 24 + 3 * 8 + 3 * 8 + 2 * 4;
    let aligned = (raw + 7) & !7;

    let size = size_of::<MsqidDs>();
    let align = align_of::<MsqidDs>();
    println!(
        "MsqidDs => size: {size}, expected: {aligned}, align: {align}, offsets: [stime:{}, cbytes:{}, qbytes:{}, lspid:{}, lrpid:{}]",
        offset_of!(MsqidDs, stime),
        offset_of!(MsqidDs, cbytes),
        offset_of!(MsqidDs, qbytes),
        offset_of!(MsqidDs, lspid),
        offset_of!(MsqidDs, lrpid),
    );

    assert_eq!(size, aligned);
    assert_eq!(align, align_of::<u64>());
    assert_eq!(offset_of!(MsqidDs, perm), 0);
    assert_eq!(offset_of!(MsqidDs, stime), 24);
    assert_eq!(offset_of!(MsqidDs, rtime), 32);
    assert_eq!(offset_of!(MsqidDs, ctime), 40);
    assert_eq!(offset_of!(MsqidDs, cbytes), 48);
    assert_eq!(offset_of!(MsqidDs, qnum), 56);
    assert_eq!(offset_of!(MsqidDs, qbytes), 64);
    assert_eq!(offset_of!(MsqidDs, lspid), 72);
    assert_eq!(offset_of!(MsqidDs, lrpid), 76);
}

#[test]
fn test_msg_info_layout() {
    let size = size_of::<MsgInfo>();
    println!("MsgInfo => size: {size}, align: {}", align_of::<MsgInfo>());

    assert_eq!(size, 32);
    assert_eq!(offset_of!(MsgInfo, msgpool), 0);
    assert_eq!(offset_of!(MsgInfo, msgtql), 24);
    assert_eq!(offset_of!(MsgInfo, msgseg), 28);
}
