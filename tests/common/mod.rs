//! Ustar fixture builder shared by the integration tests.

const BLOCK: usize = 512;

pub struct ArchiveBuilder {
    data: Vec<u8>,
    padding_blocks: usize,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            padding_blocks: 2,
        }
    }

    pub fn file(mut self, name: &str, content: &[u8]) -> Self {
        self.push_header(name, content.len() as u64, b'0', "");
        self.data.extend_from_slice(content);
        let tail = content.len() % BLOCK;
        if tail != 0 {
            self.data.extend(std::iter::repeat_n(0u8, BLOCK - tail));
        }
        self
    }

    pub fn dir(mut self, name: &str) -> Self {
        self.push_header(name, 0, b'5', "");
        self
    }

    pub fn symlink(mut self, name: &str, target: &str) -> Self {
        self.push_header(name, 0, b'2', target);
        self
    }

    #[allow(dead_code)]
    pub fn padding_blocks(mut self, blocks: usize) -> Self {
        self.padding_blocks = blocks;
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        self.data
            .extend(std::iter::repeat_n(0u8, self.padding_blocks * BLOCK));
        self.data
    }

    fn push_header(&mut self, name: &str, size: u64, typeflag: u8, linkname: &str) {
        let mut block = [0u8; BLOCK];
        block[..name.len()].copy_from_slice(name.as_bytes());
        block[100..107].copy_from_slice(b"0000644");
        block[108..115].copy_from_slice(b"0001750");
        block[116..123].copy_from_slice(b"0001750");
        block[124..136].copy_from_slice(format!("{:011o}\0", size).as_bytes());
        block[136..148].copy_from_slice(b"14460000000\0");
        block[156] = typeflag;
        block[157..157 + linkname.len()].copy_from_slice(linkname.as_bytes());
        block[257..263].copy_from_slice(b"ustar\0");
        block[263..265].copy_from_slice(b"00");

        let sum: u64 = block
            .iter()
            .enumerate()
            .map(|(i, &b)| if (148..156).contains(&i) { b' ' as u64 } else { b as u64 })
            .sum();
        block[148..156].copy_from_slice(format!("{:06o}\0 ", sum).as_bytes());

        self.data.extend_from_slice(&block);
    }
}
